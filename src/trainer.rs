use std::time::Instant;

use async_trait::async_trait;
use ndarray::Axis;

use crate::data::Dataset;
use crate::error::Result;
use crate::hyperparameters::Hyperparameters;
use crate::metrics::{EpochMetrics, History};
use crate::model::Model;
use crate::visualization::FitCallbacks;

/// Fits a compiled model to a dataset.
#[async_trait]
pub trait Trainer: Send + Sync {
    /// Runs `hyperparameters.epochs` epochs of mini-batch training, updating
    /// `model` in place. Returns only once every epoch has finished.
    async fn train(
        &self,
        model: &mut Model,
        dataset: &Dataset,
        hyperparameters: &Hyperparameters,
        callbacks: &mut dyn FitCallbacks,
    ) -> Result<History>;
}

/// Shuffled mini-batch training with a validation pass after every epoch.
#[derive(Debug, Clone, Default)]
pub struct FitTrainer {
    /// Seed for the per-epoch shuffle; random when unset
    pub shuffle_seed: Option<u64>,
}

impl FitTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shuffle_seed(seed: u64) -> Self {
        FitTrainer { shuffle_seed: Some(seed) }
    }
}

#[async_trait]
impl Trainer for FitTrainer {
    async fn train(
        &self,
        model: &mut Model,
        dataset: &Dataset,
        hyperparameters: &Hyperparameters,
        callbacks: &mut dyn FitCallbacks,
    ) -> Result<History> {
        hyperparameters.validate()?;

        let mut rng = match self.shuffle_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut indices: Vec<usize> = (0..dataset.train_len()).collect();
        let mut history = History::new();

        for epoch in 1..=hyperparameters.epochs {
            let started = Instant::now();
            rng.shuffle(&mut indices);

            for (batch, chunk) in indices.chunks(hyperparameters.batch_size).enumerate() {
                let xs = dataset.xs.select(Axis(0), chunk);
                let ys = dataset.ys.select(Axis(0), chunk);
                let loss = model.train_batch(&xs, &ys)?;
                callbacks.on_batch_end(batch, loss);
            }

            let train = model.evaluate(&dataset.xs, &dataset.ys)?;
            let val = model.evaluate(&dataset.xs_val, &dataset.ys_val)?;
            let metrics = EpochMetrics {
                epoch,
                loss: train.loss,
                accuracy: train.accuracy,
                val_loss: val.loss,
                val_accuracy: val.accuracy,
                duration_secs: started.elapsed().as_secs_f64(),
            };
            callbacks.on_epoch_end(&metrics);
            history.record(metrics);

            tokio::task::yield_now().await;
        }

        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModelBuilder;
    use crate::data::{DatasetLoader, SyntheticLoader};
    use crate::error::SweepError;

    #[derive(Default)]
    struct Recorder {
        batches: usize,
        epochs: Vec<usize>,
    }

    impl FitCallbacks for Recorder {
        fn on_batch_end(&mut self, _batch: usize, _loss: f32) {
            self.batches += 1;
        }

        fn on_epoch_end(&mut self, metrics: &EpochMetrics) {
            self.epochs.push(metrics.epoch);
        }
    }

    #[tokio::test]
    async fn test_epoch_and_batch_counts() {
        let dataset = SyntheticLoader { train_samples: 50, val_samples: 10, ..Default::default() }
            .load()
            .await
            .unwrap();
        let hp = Hyperparameters::new(0.01, 16, 3, vec![8]);
        let mut model = ModelBuilder::new().with_seed(5).build(&hp).unwrap();
        let mut recorder = Recorder::default();

        let history = FitTrainer::with_shuffle_seed(1)
            .train(&mut model, &dataset, &hp, &mut recorder)
            .await
            .unwrap();

        // 50 rows in batches of 16 is 4 batches per epoch, the last one short
        assert_eq!(recorder.batches, 12);
        assert_eq!(recorder.epochs, vec![1, 2, 3]);
        assert_eq!(history.len(), 3);
        assert!(history.epochs.iter().all(|m| m.loss.is_finite() && m.val_loss.is_finite()));

        // Training metrics come from one pass over the final weights
        let last = history.last().unwrap();
        let train = model.evaluate(&dataset.xs, &dataset.ys).unwrap();
        assert_eq!(last.loss, train.loss);
        assert_eq!(last.accuracy, train.accuracy);

        let val = model.evaluate(&dataset.xs_val, &dataset.ys_val).unwrap();
        assert_eq!(last.val_loss, val.loss);
    }

    #[tokio::test]
    async fn test_learns_synthetic_classes() {
        let dataset = SyntheticLoader { train_samples: 200, val_samples: 50, ..Default::default() }
            .load()
            .await
            .unwrap();
        let hp = Hyperparameters::new(0.001, 32, 8, vec![32]);
        let mut model = ModelBuilder::new().with_seed(9).build(&hp).unwrap();

        let history = FitTrainer::with_shuffle_seed(2)
            .train(&mut model, &dataset, &hp, &mut Recorder::default())
            .await
            .unwrap();

        let first = &history.epochs[0];
        let last = history.last().unwrap();
        assert!(last.loss < first.loss);
        assert!(last.val_accuracy > 0.5, "val accuracy {}", last.val_accuracy);
    }

    #[tokio::test]
    async fn test_invalid_hyperparameters_fail() {
        let dataset = SyntheticLoader { train_samples: 10, val_samples: 0, ..Default::default() }
            .load()
            .await
            .unwrap();
        let good = Hyperparameters::new(0.01, 4, 1, vec![4]);
        let mut model = ModelBuilder::new().build(&good).unwrap();

        let bad = Hyperparameters { batch_size: 0, ..good };
        let err = FitTrainer::new()
            .train(&mut model, &dataset, &bad, &mut Recorder::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SweepError::Configuration(_)));
    }
}
