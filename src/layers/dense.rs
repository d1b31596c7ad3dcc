use crate::activation::ActivationType;
use crate::error::{Result, SweepError};
use crate::layers::Layer;
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::LayerParams;

/// Fully connected layer, `y = act(x · Wᵀ + b)`.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub params: LayerParams,
}

impl DenseLayer {
    pub fn new<R: Rng + ?Sized>(
        inputs: usize,
        neurons: usize,
        activation: ActivationType,
        rng: &mut R,
    ) -> Result<Self> {
        // Glorot normal
        let std_dev = (2.0 / (inputs + neurons) as f32).sqrt();
        let normal_dist = Normal::new(0.0, std_dev).map_err(|e| {
            SweepError::configuration(format!(
                "cannot initialize {}x{} dense layer: {}",
                neurons, inputs, e
            ))
        })?;

        // weights are (neurons × inputs)
        let weights: Array2<f32> = Array2::from_shape_fn((neurons, inputs), |_| normal_dist.sample(&mut *rng));
        let bias: Array1<f32> = Array1::zeros(neurons);

        let params = LayerParams {
            neurons,
            inputs,
            weights,
            bias,
            activation,
            weight_grads: Array2::zeros((neurons, inputs)),
            bias_grads: Array1::zeros(neurons),
            input_cache: Array2::zeros((0, inputs)),
            preactivation_cache: Array2::zeros((0, neurons)),
        };

        Ok(DenseLayer { params })
    }

    fn preactivation(&self, input: &Array2<f32>) -> Array2<f32> {
        assert_eq!(input.ncols(), self.params.inputs, "Input size does not match layer's input size");

        // (batch × inputs) · (inputs × neurons) + bias broadcast over rows
        input.dot(&self.params.weights.t()) + &self.params.bias
    }
}

impl Layer for DenseLayer {
    fn forward(&mut self, input: &Array2<f32>) -> Array2<f32> {
        let output = self.preactivation(input);
        let activated = self.params.activation.forward(&output);
        self.params.input_cache = input.clone();
        self.params.preactivation_cache = output;
        activated
    }

    fn infer(&self, input: &Array2<f32>) -> Array2<f32> {
        self.params.activation.forward(&self.preactivation(input))
    }

    fn backward(&mut self, grad_output: &Array2<f32>) -> Array2<f32> {
        let dlayer = self.params.activation.backward(&self.params.preactivation_cache, grad_output);

        // (neurons × batch) · (batch × inputs)
        let weight_grads = dlayer.t().dot(&self.params.input_cache);
        self.params.weight_grads = &self.params.weight_grads + &weight_grads;
        self.params.bias_grads = &self.params.bias_grads + &dlayer.sum_axis(Axis(0));

        // (batch × neurons) · (neurons × inputs)
        dlayer.dot(&self.params.weights)
    }

    fn clone_box(&self) -> Box<dyn Layer> {
        Box::new(self.clone())
    }

    fn params(&self) -> &LayerParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut LayerParams {
        &mut self.params
    }
}
