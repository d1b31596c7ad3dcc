//! Sequential hyperparameter sweep.

use tracing::{debug, info, info_span, Instrument};

use crate::builder::ModelBuilder;
use crate::data::{Dataset, DatasetLoader};
use crate::error::Result;
use crate::hyperparameters::{Hyperparameters, SearchSpace};
use crate::trainer::Trainer;
use crate::visualization::{trial_display_name, Visualizer};

/// Receives one line per completed trial.
pub trait LogSink: Send + Sync {
    fn trial_finished(&self, line: &str);
}

/// Writes completion lines as `info` events.
#[derive(Debug, Clone, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn trial_finished(&self, line: &str) {
        info!("{}", line);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Pending,
    Training,
    Done,
}

/// The line reported once a trial's training has finished.
pub fn completion_line(hyperparameters: &Hyperparameters) -> Result<String> {
    Ok(format!(
        "Finished training with hyperparameters: {}",
        serde_json::to_string(hyperparameters)?
    ))
}

/// Builds and trains one model per configuration, strictly in order and one
/// at a time. The first failure aborts the remaining trials.
pub struct SweepController<T, V, S> {
    builder: ModelBuilder,
    trainer: T,
    visualizer: V,
    sink: S,
}

impl<T, V, S> SweepController<T, V, S>
where
    T: Trainer,
    V: Visualizer,
    S: LogSink,
{
    pub fn new(builder: ModelBuilder, trainer: T, visualizer: V, sink: S) -> Self {
        SweepController {
            builder,
            trainer,
            visualizer,
            sink,
        }
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs every trial in `space` against the shared `dataset` and returns
    /// how many completed.
    pub async fn run(&self, space: &SearchSpace, dataset: &Dataset) -> Result<usize> {
        let total = space.len();
        info!(trials = total, "sweep started");

        for (index, hyperparameters) in space.iter().enumerate() {
            let trial = index + 1;
            self.run_trial(trial, hyperparameters, dataset)
                .instrument(info_span!("trial", trial, total))
                .await?;
        }

        info!(trials = total, "sweep finished");
        Ok(total)
    }

    /// Loads the dataset once, then runs the sweep on it. A load failure
    /// returns before any trial starts.
    pub async fn load_and_run<L>(&self, loader: &L, space: &SearchSpace) -> Result<usize>
    where
        L: DatasetLoader + ?Sized,
    {
        let dataset = loader.load().await?;
        self.run(space, &dataset).await
    }

    async fn run_trial(
        &self,
        trial: usize,
        hyperparameters: &Hyperparameters,
        dataset: &Dataset,
    ) -> Result<()> {
        let mut state = TrialState::Pending;
        debug!(?state, ?hyperparameters);

        let mut model = self.builder.build(hyperparameters)?;
        let mut callbacks = self.visualizer.fit_callbacks(&trial_display_name(trial));

        state = TrialState::Training;
        debug!(?state, parameters = model.parameter_count());
        let history = self
            .trainer
            .train(&mut model, dataset, hyperparameters, callbacks.as_mut())
            .await?;

        state = TrialState::Done;
        debug!(?state, epochs = history.len());
        self.sink.trial_finished(&completion_line(hyperparameters)?);
        Ok(())
    }
}
