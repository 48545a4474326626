//! # Trade Math
//!
//! Numeric building blocks for price-series analysis and forecasting:
//! moving averages, min-max scaling, sequence windowing, differencing and
//! autoregressive estimation. Nothing here knows about dates or prices;
//! callers pass plain `f64` slices.

use thiserror::Error;

pub mod autoregression;
pub mod differencing;
pub mod moving_averages;
pub mod scaling;
pub mod windowing;

pub use autoregression::AutoRegression;
pub use differencing::{difference, Differenced};
pub use moving_averages::{ExponentialMovingAverage, SimpleMovingAverage};
pub use scaling::MinMaxScaler;
pub use windowing::{sequence_windows, SequenceWindow};

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
