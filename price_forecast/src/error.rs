//! Error types for the price_forecast crate

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The input series has no observations
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// The series is too short for the requested window, order or horizon
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Bad horizon, strategy, configuration or series shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Numerical non-convergence or training divergence
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// The recurrent backend was not compiled into this build
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV decoding or encoding
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A field could not be parsed
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// A configuration file could not be read
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Stable machine-readable tag for a [`ForecastError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptySeries,
    InsufficientData,
    InvalidRequest,
    ModelFit,
    BackendUnavailable,
    Io,
    DataFormat,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptySeries => "empty_series",
            ErrorKind::InsufficientData => "insufficient_data",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::ModelFit => "model_fit",
            ErrorKind::BackendUnavailable => "backend_unavailable",
            ErrorKind::Io => "io",
            ErrorKind::DataFormat => "data_format",
            ErrorKind::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::EmptySeries(_) => ErrorKind::EmptySeries,
            ForecastError::InsufficientData(_) => ErrorKind::InsufficientData,
            ForecastError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ForecastError::ModelFit(_) => ErrorKind::ModelFit,
            ForecastError::BackendUnavailable(_) => ErrorKind::BackendUnavailable,
            ForecastError::IoError(_) => ErrorKind::Io,
            ForecastError::CsvError(_) | ForecastError::DataFormat(_) => ErrorKind::DataFormat,
            ForecastError::ConfigError(_) => ErrorKind::Config,
        }
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => ForecastError::InsufficientData(msg),
            MathError::InvalidInput(msg) => ForecastError::InvalidRequest(msg),
            MathError::CalculationError(msg) => ForecastError::ModelFit(msg),
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
