//! Turns a [`Hyperparameters`] record into a compiled [`Model`].

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::activation::ActivationType;
use crate::error::Result;
use crate::hyperparameters::Hyperparameters;
use crate::layers::{DenseLayer, Layer};
use crate::metrics::Metric;
use crate::model::Model;
use crate::optimizer::Adam;
use crate::Loss;

/// Feature count of every input row.
pub const INPUT_FEATURES: usize = 784;

/// Width of the logits layer.
pub const OUTPUT_CLASSES: usize = 10;

#[derive(Debug, Clone)]
pub struct ModelBuilder {
    seed: Option<u64>,
    activation: ActivationType,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        ModelBuilder {
            seed: None,
            activation: ActivationType::Linear,
        }
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes weight initialization reproducible. Each `build` still gets its
    /// own generator, so models never share state.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Activation of the hidden layers. The logits layer stays linear.
    pub fn with_activation(mut self, activation: ActivationType) -> Self {
        self.activation = activation;
        self
    }

    pub fn build(&self, hyperparameters: &Hyperparameters) -> Result<Model> {
        hyperparameters.validate()?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut layers: Vec<Box<dyn Layer>> = Vec::with_capacity(hyperparameters.hidden_layers.len() + 1);
        let mut inputs = INPUT_FEATURES;
        for &width in &hyperparameters.hidden_layers {
            layers.push(Box::new(DenseLayer::new(inputs, width, self.activation, &mut rng)?));
            inputs = width;
        }
        layers.push(Box::new(DenseLayer::new(inputs, OUTPUT_CLASSES, ActivationType::Linear, &mut rng)?));

        let model = Model::compile(
            layers,
            Adam::new(hyperparameters.learning_rate),
            Loss::CategoricalCrossEntropy,
            vec![Metric::Accuracy],
        )?;
        debug!(
            widths = ?model.layer_widths(),
            parameters = model.parameter_count(),
            "model compiled"
        );
        Ok(model)
    }
}
