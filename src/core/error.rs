//! Error types for BS Options

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BSError {
    #[error("Invalid interval: {0} (expected 'month', 'quarter', 'year' or 'two_years')")]
    InvalidInterval(String),

    #[error("Invalid option type: {0} (expected 'call' or 'put')")]
    InvalidOptionType(String),

    #[error("Insufficient price history: need {required} observations, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("Degenerate pricing input: {0}")]
    DegenerateInput(String),

    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type BSResult<T> = Result<T, BSError>;

impl BSError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateInput(msg.into())
    }

    pub fn invalid_series(msg: impl Into<String>) -> Self {
        Self::InvalidSeries(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn insufficient_history(required: usize, actual: usize) -> Self {
        Self::InsufficientHistory { required, actual }
    }
}

impl From<serde_json::Error> for BSError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
