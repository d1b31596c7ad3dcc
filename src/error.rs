//! Error types for the sweep.

use thiserror::Error;

/// Every failure a sweep can hit. None of these are recovered locally; they
/// propagate to the caller and abort the remaining trials.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SweepError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn data_load(msg: impl Into<String>) -> Self {
        Self::DataLoad(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
