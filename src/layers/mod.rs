pub mod dense;

use std::fmt::Debug;
use ndarray::{Array1, Array2};
use crate::activation::ActivationType;

/// Parameters, gradients and forward caches shared by every trainable layer.
/// Batched arrays are row-major: one row per sample.
#[derive(Debug, Clone)]
pub struct LayerParams {
    pub neurons: usize,
    pub inputs: usize,
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
    pub activation: ActivationType,
    pub weight_grads: Array2<f32>,
    pub bias_grads: Array1<f32>,
    pub input_cache: Array2<f32>,
    pub preactivation_cache: Array2<f32>,
}

impl LayerParams {
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }
}

pub trait Layer: Debug + Send + Sync {
    /// Training forward pass; caches what `backward` needs.
    fn forward(&mut self, input: &Array2<f32>) -> Array2<f32>;

    /// Inference forward pass, leaves the caches alone.
    fn infer(&self, input: &Array2<f32>) -> Array2<f32>;

    /// Accumulates parameter gradients from the last `forward` and returns
    /// the gradient with respect to that forward's input.
    fn backward(&mut self, grad_output: &Array2<f32>) -> Array2<f32>;

    fn clone_box(&self) -> Box<dyn Layer>;

    fn params(&self) -> &LayerParams;
    fn params_mut(&mut self) -> &mut LayerParams;

    fn zero_grads(&mut self) {
        let params = self.params_mut();
        params.weight_grads.fill(0.0);
        params.bias_grads.fill(0.0);
    }
}

impl Clone for Box<dyn Layer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub use dense::DenseLayer;
