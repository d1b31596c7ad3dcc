use automl::{
    FitTrainer,
    ModelBuilder,
    SearchSpace,
    SweepController,
    SyntheticLoader,
    TracingLogSink,
    TracingVisualizer,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::new("info"))
        .init();

    let controller = SweepController::new(
        ModelBuilder::new(),
        FitTrainer::new(),
        TracingVisualizer::default(),
        TracingLogSink,
    );
    controller
        .load_and_run(&SyntheticLoader::default(), &SearchSpace::default())
        .await?;

    Ok(())
}
