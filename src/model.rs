use ndarray::Array2;

use crate::error::{Result, SweepError};
use crate::layers::Layer;
use crate::metrics::Metric;
use crate::optimizer::Adam;
use crate::Loss;

/// A compiled sequential model: layers plus the optimizer, loss and metrics
/// it trains with.
#[derive(Debug, Clone)]
pub struct Model {
    pub layers: Vec<Box<dyn Layer>>,
    pub loss: Loss,
    pub optimizer: Adam,
    pub metrics: Vec<Metric>,
}

/// Loss and metric values for one pass over a split
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub loss: f32,
    pub accuracy: f32,
}

impl Model {
    /// Compiles `layers` into a trainable model.
    ///
    /// # Arguments
    ///
    /// * `layers` - Layers in forward order; each one's inputs must equal the
    ///   previous one's neurons
    /// * `optimizer` - Optimizer applied after every batch
    /// * `loss` - Loss minimized during training
    /// * `metrics` - Metrics reported on evaluation
    pub fn compile(
        layers: Vec<Box<dyn Layer>>,
        optimizer: Adam,
        loss: Loss,
        metrics: Vec<Metric>,
    ) -> Result<Self> {
        if layers.is_empty() {
            return Err(SweepError::configuration("a model needs at least one layer"));
        }
        for pair in layers.windows(2) {
            let (lower, upper) = (pair[0].params(), pair[1].params());
            if lower.neurons != upper.inputs {
                return Err(SweepError::configuration(format!(
                    "layer widths do not chain: {} outputs feed {} inputs",
                    lower.neurons, upper.inputs
                )));
            }
        }

        Ok(Model {
            layers,
            loss,
            optimizer,
            metrics,
        })
    }

    pub fn input_features(&self) -> usize {
        self.layers[0].params().inputs
    }

    pub fn output_classes(&self) -> usize {
        self.layers[self.layers.len() - 1].params().neurons
    }

    pub fn layer_widths(&self) -> Vec<usize> {
        self.layers.iter().map(|layer| layer.params().neurons).collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.params().parameter_count()).sum()
    }

    /// Raw logits for a batch, without touching the training caches.
    pub fn predict(&self, inputs: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_input(inputs)?;
        let mut current = inputs.clone();
        for layer in &self.layers {
            current = layer.infer(&current);
        }
        Ok(current)
    }

    fn forward(&mut self, inputs: &Array2<f32>) -> Array2<f32> {
        let mut current = inputs.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current);
        }
        current
    }

    fn backward(&mut self, grad_logits: Array2<f32>) {
        let mut grad = grad_logits;
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad);
        }
    }

    /// One optimization step over a mini-batch; returns the batch loss.
    pub fn train_batch(
        &mut self,
        inputs: &Array2<f32>,
        targets: &Array2<f32>,
    ) -> Result<f32> {
        self.check_input(inputs)?;
        self.check_targets(inputs, targets)?;

        self.zero_gradients();
        let logits = self.forward(inputs);
        let loss = self.loss.calculate(&logits, targets);
        if !loss.is_finite() {
            return Err(SweepError::training(format!("loss diverged to {}", loss)));
        }

        let grad = self.loss.gradient(&logits, targets);
        self.backward(grad);
        self.optimizer.step(&mut self.layers);
        Ok(loss)
    }

    /// Loss and accuracy over a whole split.
    pub fn evaluate(
        &self,
        inputs: &Array2<f32>,
        targets: &Array2<f32>,
    ) -> Result<Evaluation> {
        self.check_targets(inputs, targets)?;
        let logits = self.predict(inputs)?;
        let loss = self.loss.calculate(&logits, targets);
        if !loss.is_finite() {
            return Err(SweepError::training(format!("evaluation loss is {}", loss)));
        }

        let accuracy = if self.metrics.contains(&Metric::Accuracy) {
            Metric::Accuracy.compute(&logits, targets)
        } else {
            0.0
        };
        Ok(Evaluation { loss, accuracy })
    }

    pub fn zero_gradients(&mut self) {
        for layer in &mut self.layers {
            layer.zero_grads();
        }
    }

    fn check_input(&self, inputs: &Array2<f32>) -> Result<()> {
        if inputs.ncols() != self.input_features() {
            return Err(SweepError::training(format!(
                "input has {} features, model expects {}",
                inputs.ncols(),
                self.input_features()
            )));
        }
        Ok(())
    }

    fn check_targets(&self, inputs: &Array2<f32>, targets: &Array2<f32>) -> Result<()> {
        if targets.ncols() != self.output_classes() || targets.nrows() != inputs.nrows() {
            return Err(SweepError::training(format!(
                "targets shaped {:?} do not match {} rows x {} classes",
                targets.dim(),
                inputs.nrows(),
                self.output_classes()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationType;
    use crate::layers::DenseLayer;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_model(widths: &[(usize, usize)], activation: ActivationType) -> Result<Model> {
        let mut rng = StdRng::seed_from_u64(11);
        let layers = widths
            .iter()
            .map(|&(inputs, neurons)| {
                DenseLayer::new(inputs, neurons, activation, &mut rng)
                    .map(|layer| Box::new(layer) as Box<dyn Layer>)
            })
            .collect::<Result<Vec<_>>>()?;
        Model::compile(layers, Adam::new(0.01), Loss::CategoricalCrossEntropy, vec![Metric::Accuracy])
    }

    #[test]
    fn test_parameter_count_accuracy() {
        // (20*16) + (16*12) + (12*8) + (8*4) weights, 16 + 12 + 8 + 4 biases
        let model = small_model(&[(20, 16), (16, 12), (12, 8), (8, 4)], ActivationType::ReLU).unwrap();
        assert_eq!(model.parameter_count(), 680);
        assert_eq!(model.layer_widths(), vec![16, 12, 8, 4]);
    }

    #[test]
    fn test_compile_rejects_unchained_layers() {
        let err = small_model(&[(3, 4), (5, 2)], ActivationType::ReLU).unwrap_err();
        assert!(matches!(err, SweepError::Configuration(_)));
    }

    #[test]
    fn test_predict_shape() {
        let model = small_model(&[(3, 4), (4, 2)], ActivationType::ReLU).unwrap();
        let output = model.predict(&array![[1.0, 2.0, 3.0], [0.0, 0.0, 1.0]]).unwrap();
        assert_eq!(output.dim(), (2, 2));
    }

    #[test]
    fn test_predict_invalid_input_size() {
        let model = small_model(&[(3, 4), (4, 2)], ActivationType::ReLU).unwrap();
        let err = model.predict(&array![[1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, SweepError::Training(_)));
    }

    #[test]
    fn test_training_reduces_loss() {
        let mut model = small_model(&[(2, 8), (8, 2)], ActivationType::Linear).unwrap();
        let inputs = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.1], [0.1, 1.0]];
        let targets = array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]];

        let first = model.train_batch(&inputs, &targets).unwrap();
        let mut last = first;
        for _ in 0..100 {
            last = model.train_batch(&inputs, &targets).unwrap();
        }

        assert!(first.is_finite());
        assert!(last < first, "loss went from {} to {}", first, last);
        assert_eq!(model.evaluate(&inputs, &targets).unwrap().accuracy, 1.0);
    }

    #[test]
    fn test_train_batch_rejects_bad_targets() {
        let mut model = small_model(&[(2, 3), (3, 2)], ActivationType::Linear).unwrap();
        let err = model
            .train_batch(&array![[1.0, 0.0]], &array![[1.0, 0.0, 0.0]])
            .unwrap_err();
        assert!(matches!(err, SweepError::Training(_)));
    }

    #[test]
    fn test_non_finite_loss_is_training_error() {
        let mut model = small_model(&[(2, 3), (3, 2)], ActivationType::Linear).unwrap();
        let err = model
            .train_batch(&array![[f32::NAN, 0.0]], &array![[1.0, 0.0]])
            .unwrap_err();
        assert!(matches!(err, SweepError::Training(_)));
    }
}
