mod activation;
mod builder;
mod data;
mod error;
mod hyperparameters;
mod layers;
mod loss;
mod metrics;
mod model;
mod optimizer;
mod sweep;
mod trainer;
mod visualization;

pub use activation::ActivationType;
pub use builder::{ModelBuilder, INPUT_FEATURES, OUTPUT_CLASSES};
pub use data::{Dataset, DatasetLoader, SyntheticLoader};
pub use error::{Result, SweepError};
pub use hyperparameters::{Hyperparameters, SearchSpace};
pub use layers::{DenseLayer, Layer, LayerParams};
pub use loss::Loss;
pub use metrics::{EpochMetrics, History, Metric};
pub use model::{Evaluation, Model};
pub use optimizer::Adam;
pub use sweep::{completion_line, LogSink, SweepController, TracingLogSink, TrialState};
pub use trainer::{FitTrainer, Trainer};
pub use visualization::{trial_display_name, FitCallbacks, TracingVisualizer, Visualizer, DISPLAY_NAME};
