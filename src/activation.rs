use ndarray::Array2;

/// Non-linearity applied to a dense layer's preactivation. Layers call the
/// batch methods, `apply`/`derivative` are the per-element rules behind them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivationType {
    Sigmoid,
    ReLU,
    Tanh,
    Linear,
}

impl ActivationType {
    /// Activation of one preactivation value
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            ActivationType::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationType::ReLU => x.max(0.0),
            ActivationType::Tanh => x.tanh(),
            ActivationType::Linear => x,
        }
    }

    /// d(activation)/d(preactivation) at one value
    pub fn derivative(&self, x: f32) -> f32 {
        match self {
            ActivationType::Sigmoid => {
                let sigmoid = 1.0 / (1.0 + (-x).exp());
                sigmoid * (1.0 - sigmoid)
            },
            ActivationType::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationType::Tanh => 1.0 - x.tanh().powi(2),
            ActivationType::Linear => 1.0,
        }
    }

    /// Activates a `(batch × neurons)` preactivation.
    pub fn forward(&self, preactivation: &Array2<f32>) -> Array2<f32> {
        match self {
            ActivationType::Linear => preactivation.clone(),
            _ => preactivation.mapv(|x| self.apply(x)),
        }
    }

    /// Chains `grad_output` (gradient w.r.t. the activated output) back to
    /// the preactivation cached by the forward pass.
    pub fn backward(&self, preactivation: &Array2<f32>, grad_output: &Array2<f32>) -> Array2<f32> {
        match self {
            ActivationType::Linear => grad_output.clone(),
            _ => grad_output * &preactivation.mapv(|x| self.derivative(x)),
        }
    }
}
