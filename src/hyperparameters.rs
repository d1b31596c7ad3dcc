use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// Tunable values for a single trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Learning rate handed to the Adam optimizer
    pub learning_rate: f32,

    /// Rows per mini-batch
    pub batch_size: usize,

    /// Number of training epochs
    pub epochs: usize,

    /// Widths of the hidden dense layers, in order
    pub hidden_layers: Vec<usize>,
}

impl Hyperparameters {
    pub fn new(
        learning_rate: f32,
        batch_size: usize,
        epochs: usize,
        hidden_layers: Vec<usize>,
    ) -> Self {
        Hyperparameters {
            learning_rate,
            batch_size,
            epochs,
            hidden_layers,
        }
    }

    /// Rejects anything a model cannot be built or trained from.
    pub fn validate(&self) -> Result<()> {
        if self.hidden_layers.is_empty() {
            return Err(SweepError::configuration(
                "at least one hidden layer width is required",
            ));
        }
        if let Some(pos) = self.hidden_layers.iter().position(|&w| w == 0) {
            return Err(SweepError::configuration(format!(
                "hidden layer {} has zero width",
                pos
            )));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(SweepError::configuration(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size == 0 {
            return Err(SweepError::configuration("batch size must be positive"));
        }
        if self.epochs == 0 {
            return Err(SweepError::configuration("epoch count must be positive"));
        }
        Ok(())
    }
}

/// An ordered, immutable list of trial configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Hyperparameters>", into = "Vec<Hyperparameters>")]
pub struct SearchSpace {
    trials: Vec<Hyperparameters>,
}

impl SearchSpace {
    pub fn new(trials: Vec<Hyperparameters>) -> Result<Self> {
        for hp in &trials {
            hp.validate()?;
        }
        Ok(SearchSpace { trials })
    }

    /// Parses a JSON array of configurations.
    pub fn from_json(json: &str) -> Result<Self> {
        let trials: Vec<Hyperparameters> = serde_json::from_str(json)?;
        Self::new(trials)
    }

    pub fn trials(&self) -> &[Hyperparameters] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hyperparameters> {
        self.trials.iter()
    }
}

impl TryFrom<Vec<Hyperparameters>> for SearchSpace {
    type Error = SweepError;

    fn try_from(trials: Vec<Hyperparameters>) -> Result<Self> {
        SearchSpace::new(trials)
    }
}

impl From<SearchSpace> for Vec<Hyperparameters> {
    fn from(space: SearchSpace) -> Self {
        space.trials
    }
}

impl Default for SearchSpace {
    fn default() -> Self {
        SearchSpace {
            trials: vec![
                Hyperparameters::new(0.01, 32, 10, vec![128, 64]),
                Hyperparameters::new(0.005, 64, 15, vec![256, 128]),
                Hyperparameters::new(0.001, 128, 20, vec![512, 256]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_search_space() {
        let space = SearchSpace::default();

        assert_eq!(space.len(), 3);
        assert_eq!(space.trials()[0].learning_rate, 0.01);
        assert_eq!(space.trials()[1].batch_size, 64);
        assert_eq!(space.trials()[2].epochs, 20);
        assert_eq!(space.trials()[2].hidden_layers, vec![512, 256]);
        assert!(space.iter().all(|hp| hp.validate().is_ok()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = vec![
            Hyperparameters::new(0.01, 32, 10, vec![]),
            Hyperparameters::new(0.01, 32, 10, vec![64, 0]),
            Hyperparameters::new(0.0, 32, 10, vec![64]),
            Hyperparameters::new(f32::NAN, 32, 10, vec![64]),
            Hyperparameters::new(0.01, 0, 10, vec![64]),
            Hyperparameters::new(0.01, 32, 0, vec![64]),
        ];

        for hp in cases {
            assert!(
                matches!(hp.validate(), Err(SweepError::Configuration(_))),
                "expected configuration error for {:?}",
                hp
            );
        }
    }

    #[test]
    fn test_from_json() {
        let space = SearchSpace::from_json(
            r#"[{"learning_rate":0.02,"batch_size":16,"epochs":2,"hidden_layers":[32]}]"#,
        )
        .unwrap();

        assert_eq!(space.trials(), &[Hyperparameters::new(0.02, 16, 2, vec![32])]);
    }

    #[test]
    fn test_from_json_validates() {
        let err = SearchSpace::from_json(
            r#"[{"learning_rate":0.02,"batch_size":16,"epochs":2,"hidden_layers":[]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::Configuration(_)));

        let err = SearchSpace::from_json("not json").unwrap_err();
        assert!(matches!(err, SweepError::Serialization(_)));
    }

    #[test]
    fn test_deserialize_validates() {
        let result = serde_json::from_str::<SearchSpace>(
            r#"[{"learning_rate":0.02,"batch_size":16,"epochs":2,"hidden_layers":[]}]"#,
        );
        assert!(result.is_err());

        let space = SearchSpace::default();
        let json = serde_json::to_string(&space).unwrap();
        assert!(json.starts_with('['));
        assert_eq!(serde_json::from_str::<SearchSpace>(&json).unwrap(), space);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = SearchSpace::from_json("{}").unwrap_err();
        assert!(matches!(err, SweepError::Serialization(_)));
    }
}
