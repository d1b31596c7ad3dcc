//! Dataset type and the loaders that produce it.

use async_trait::async_trait;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};
use tracing::info;

use crate::builder::{INPUT_FEATURES, OUTPUT_CLASSES};
use crate::error::{Result, SweepError};

/// Training and validation splits. Inputs are `(rows × 784)`, labels are
/// one-hot `(rows × 10)`.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub xs: Array2<f32>,
    pub ys: Array2<f32>,
    pub xs_val: Array2<f32>,
    pub ys_val: Array2<f32>,
}

impl Dataset {
    pub fn new(
        xs: Array2<f32>,
        ys: Array2<f32>,
        xs_val: Array2<f32>,
        ys_val: Array2<f32>,
    ) -> Result<Self> {
        check_split("training", &xs, &ys)?;
        check_split("validation", &xs_val, &ys_val)?;
        if xs.nrows() == 0 {
            return Err(SweepError::data_load("training split is empty"));
        }

        Ok(Dataset { xs, ys, xs_val, ys_val })
    }

    pub fn train_len(&self) -> usize {
        self.xs.nrows()
    }

    pub fn val_len(&self) -> usize {
        self.xs_val.nrows()
    }
}

fn check_split(name: &str, inputs: &Array2<f32>, labels: &Array2<f32>) -> Result<()> {
    if inputs.ncols() != INPUT_FEATURES {
        return Err(SweepError::data_load(format!(
            "{} inputs have {} features, expected {}",
            name,
            inputs.ncols(),
            INPUT_FEATURES
        )));
    }
    if labels.ncols() != OUTPUT_CLASSES {
        return Err(SweepError::data_load(format!(
            "{} labels have {} classes, expected {}",
            name,
            labels.ncols(),
            OUTPUT_CLASSES
        )));
    }
    if inputs.nrows() != labels.nrows() {
        return Err(SweepError::data_load(format!(
            "{} split has {} inputs but {} labels",
            name,
            inputs.nrows(),
            labels.nrows()
        )));
    }
    Ok(())
}

#[async_trait]
pub trait DatasetLoader: Send + Sync {
    async fn load(&self) -> Result<Dataset>;
}

/// Deterministic ten-class data: each class has a random prototype image
/// and samples are that prototype plus Gaussian noise.
#[derive(Debug, Clone)]
pub struct SyntheticLoader {
    pub train_samples: usize,
    pub val_samples: usize,
    pub noise: f32,
    pub seed: u64,
}

impl Default for SyntheticLoader {
    fn default() -> Self {
        SyntheticLoader {
            train_samples: 1000,
            val_samples: 200,
            noise: 0.3,
            seed: 42,
        }
    }
}

impl SyntheticLoader {
    fn generate(&self) -> Result<Dataset> {
        if !(self.noise >= 0.0 && self.noise.is_finite()) {
            return Err(SweepError::data_load(format!("bad noise level {}", self.noise)));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let pixel = Uniform::new(0.0f32, 1.0)
            .map_err(|e| SweepError::data_load(format!("bad pixel range: {}", e)))?;
        let noise = Normal::new(0.0f32, self.noise)
            .map_err(|e| SweepError::data_load(format!("bad noise level {}: {}", self.noise, e)))?;

        let prototypes = Array2::from_shape_fn((OUTPUT_CLASSES, INPUT_FEATURES), |_| pixel.sample(&mut rng));

        let mut split = |rows: usize| {
            let mut xs = Array2::<f32>::zeros((rows, INPUT_FEATURES));
            let mut ys = Array2::<f32>::zeros((rows, OUTPUT_CLASSES));
            for row in 0..rows {
                let class = row % OUTPUT_CLASSES;
                ys[[row, class]] = 1.0;
                for col in 0..INPUT_FEATURES {
                    xs[[row, col]] = prototypes[[class, col]] + noise.sample(&mut rng);
                }
            }
            (xs, ys)
        };

        let (xs, ys) = split(self.train_samples);
        let (xs_val, ys_val) = split(self.val_samples);
        Dataset::new(xs, ys, xs_val, ys_val)
    }
}

#[async_trait]
impl DatasetLoader for SyntheticLoader {
    async fn load(&self) -> Result<Dataset> {
        let dataset = self.generate()?;
        info!(
            train = dataset.train_len(),
            val = dataset.val_len(),
            seed = self.seed,
            "synthetic dataset ready"
        );
        Ok(dataset)
    }
}
