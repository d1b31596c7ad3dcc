//! Evaluation metrics and per-epoch training history.

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
}

impl Metric {
    pub fn compute(&self, logits: &Array2<f32>, targets: &Array2<f32>) -> f32 {
        match self {
            Metric::Accuracy => {
                if logits.nrows() == 0 {
                    return 0.0;
                }
                let correct = logits
                    .axis_iter(Axis(0))
                    .zip(targets.axis_iter(Axis(0)))
                    .filter(|(prediction, target)| argmax(prediction) == argmax(target))
                    .count();
                correct as f32 / logits.nrows() as f32
            }
        }
    }
}

/// Index of the largest element; the first one wins ties.
pub fn argmax(row: &ArrayView1<f32>) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, max), (i, &x)| {
            if x > max { (i, x) } else { (best, max) }
        })
        .0
}

/// Metrics for one completed epoch. Every loss and accuracy is measured on
/// the weights as they stand at the end of the epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    /// Training split loss
    pub loss: f32,
    /// Training split accuracy
    pub accuracy: f32,
    pub val_loss: f32,
    pub val_accuracy: f32,
    pub duration_secs: f64,
}

/// Epoch metrics in the order they were produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub epochs: Vec<EpochMetrics>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, metrics: EpochMetrics) {
        self.epochs.push(metrics);
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accuracy() {
        let logits = array![[0.1, 0.9], [0.8, 0.2], [0.3, 0.7], [0.6, 0.4]];
        let targets = array![[0.0, 1.0], [1.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

        assert_eq!(Metric::Accuracy.compute(&logits, &targets), 0.5);
    }

    #[test]
    fn test_accuracy_empty_batch() {
        let empty = Array2::<f32>::zeros((0, 10));
        assert_eq!(Metric::Accuracy.compute(&empty, &empty), 0.0);
    }

    #[test]
    fn test_history_records_in_order() {
        let mut history = History::new();
        history.record(EpochMetrics { epoch: 1, loss: 2.0, ..Default::default() });
        history.record(EpochMetrics { epoch: 2, loss: 1.0, ..Default::default() });

        assert_eq!(history.len(), 2);
        assert_eq!(history.last().map(|m| m.epoch), Some(2));
    }
}
