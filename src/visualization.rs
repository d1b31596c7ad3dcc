//! Progress reporting hooks handed to the trainer.

use tracing::{debug, info};

use crate::metrics::EpochMetrics;

/// Display name prefix for trial progress.
pub const DISPLAY_NAME: &str = "AutoML Model";

/// Display name for the 1-based `trial`, unique within a sweep.
pub fn trial_display_name(trial: usize) -> String {
    format!("{} #{}", DISPLAY_NAME, trial)
}

/// Observes a single `fit` call.
pub trait FitCallbacks: Send {
    fn on_batch_end(&mut self, _batch: usize, _loss: f32) {}

    fn on_epoch_end(&mut self, metrics: &EpochMetrics);
}

/// Hands out callbacks for a named display.
pub trait Visualizer: Send + Sync {
    fn fit_callbacks(&self, name: &str) -> Box<dyn FitCallbacks>;
}

/// Reports progress as `tracing` events.
#[derive(Debug, Clone)]
pub struct TracingVisualizer {
    /// Batches between batch-level debug events
    pub log_every: usize,
}

impl Default for TracingVisualizer {
    fn default() -> Self {
        TracingVisualizer { log_every: 100 }
    }
}

impl TracingVisualizer {
    fn callbacks(&self, name: &str) -> TracingCallbacks {
        TracingCallbacks {
            name: name.to_string(),
            log_every: self.log_every.max(1),
        }
    }
}

impl Visualizer for TracingVisualizer {
    fn fit_callbacks(&self, name: &str) -> Box<dyn FitCallbacks> {
        Box::new(self.callbacks(name))
    }
}

struct TracingCallbacks {
    name: String,
    log_every: usize,
}

impl TracingCallbacks {
    fn logs_batch(&self, batch: usize) -> bool {
        batch % self.log_every == 0
    }
}

impl FitCallbacks for TracingCallbacks {
    fn on_batch_end(&mut self, batch: usize, loss: f32) {
        if self.logs_batch(batch) {
            debug!(model = %self.name, batch, loss, "batch end");
        }
    }

    fn on_epoch_end(&mut self, metrics: &EpochMetrics) {
        info!(
            model = %self.name,
            epoch = metrics.epoch,
            loss = metrics.loss,
            accuracy = metrics.accuracy,
            val_loss = metrics.val_loss,
            val_accuracy = metrics.val_accuracy,
            secs = metrics.duration_secs,
            "epoch end"
        );
    }
}
