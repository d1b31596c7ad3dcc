use ndarray::{Array1, Array2};

use crate::layers::Layer;

/// First and second moment estimates for one layer
#[derive(Debug, Clone)]
struct Moments {
    weight_m: Array2<f32>,
    weight_v: Array2<f32>,
    bias_m: Array1<f32>,
    bias_v: Array1<f32>,
}

/// Adaptive moment estimation
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    step: i32,
    moments: Vec<Moments>,
}

impl Adam {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            step: 0,
            moments: Vec::new(),
        }
    }

    pub fn steps_taken(&self) -> i32 {
        self.step
    }

    /// Applies one update from the gradients accumulated in `layers`.
    pub fn step(&mut self, layers: &mut [Box<dyn Layer>]) {
        if self.moments.len() != layers.len() {
            self.moments = layers
                .iter()
                .map(|layer| {
                    let params = layer.params();
                    Moments {
                        weight_m: Array2::zeros(params.weights.raw_dim()),
                        weight_v: Array2::zeros(params.weights.raw_dim()),
                        bias_m: Array1::zeros(params.bias.raw_dim()),
                        bias_v: Array1::zeros(params.bias.raw_dim()),
                    }
                })
                .collect();
        }

        self.step += 1;
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let lr_t = self.learning_rate * (1.0 - beta2.powi(self.step)).sqrt()
            / (1.0 - beta1.powi(self.step));

        for (layer, moments) in layers.iter_mut().zip(self.moments.iter_mut()) {
            let params = layer.params_mut();

            moments.weight_m = &moments.weight_m * beta1 + &params.weight_grads * (1.0 - beta1);
            moments.weight_v = &moments.weight_v * beta2 + &params.weight_grads.mapv(|g| g * g) * (1.0 - beta2);
            moments.bias_m = &moments.bias_m * beta1 + &params.bias_grads * (1.0 - beta1);
            moments.bias_v = &moments.bias_v * beta2 + &params.bias_grads.mapv(|g| g * g) * (1.0 - beta2);

            params.weights = &params.weights - &(&moments.weight_m / &moments.weight_v.mapv(|v| v.sqrt() + epsilon) * lr_t);
            params.bias = &params.bias - &(&moments.bias_m / &moments.bias_v.mapv(|v| v.sqrt() + epsilon) * lr_t);
        }
    }
}
