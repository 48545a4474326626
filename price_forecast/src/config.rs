//! Configuration for trend analysis and forecasting
//!
//! Every struct deserializes with `#[serde(default)]`, so a JSON file only
//! needs the fields it wants to override.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default moving-average windows
pub const DEFAULT_TREND_WINDOWS: [usize; 3] = [7, 21, 50];

/// Default number of days to forecast when the caller does not say
pub const DEFAULT_HORIZON: i64 = 30;

/// Moving-average windows used by trend analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub windows: Vec<usize>,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            windows: DEFAULT_TREND_WINDOWS.to_vec(),
        }
    }
}

/// Largest supported differencing order for the linear strategy
pub const MAX_DIFFERENCING: usize = 2;

/// ARIMA(p, d, 0) settings for the linear strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    /// Autoregressive order `p`
    pub order: usize,
    /// Differencing passes `d`
    pub differencing: usize,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            order: 5,
            differencing: 1,
        }
    }
}

impl LinearConfig {
    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(ForecastError::InvalidRequest(
                "Linear order must be greater than zero".to_string(),
            ));
        }
        if self.differencing > MAX_DIFFERENCING {
            return Err(ForecastError::InvalidRequest(format!(
                "Linear differencing must be at most {}, got {}",
                MAX_DIFFERENCING, self.differencing
            )));
        }
        Ok(())
    }
}

/// Network and training settings for the recurrent strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrentConfig {
    pub window_length: usize,
    pub epochs: usize,
    pub batch_size: usize,
    /// Units per recurrent layer
    pub hidden_width: usize,
    /// Number of stacked recurrent layers
    pub layers: usize,
    pub learning_rate: f64,
    /// Seed for weight initialisation and batch shuffling
    pub seed: u64,
}

impl Default for RecurrentConfig {
    fn default() -> Self {
        Self {
            window_length: 60,
            epochs: 5,
            batch_size: 16,
            hidden_width: 50,
            layers: 2,
            learning_rate: 0.001,
            seed: 42,
        }
    }
}

impl RecurrentConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("window_length", self.window_length),
            ("epochs", self.epochs),
            ("batch_size", self.batch_size),
            ("hidden_width", self.hidden_width),
            ("layers", self.layers),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ForecastError::InvalidRequest(format!(
                "Recurrent {} must be greater than zero",
                name
            )));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ForecastError::InvalidRequest(format!(
                "Learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Shape requirements on incoming close series
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesPolicy {
    /// Largest accepted gap between consecutive observations, in days.
    /// Covers weekends and exchange holidays; weekly or sparser data is rejected.
    pub max_gap_days: i64,
}

impl Default for SeriesPolicy {
    fn default() -> Self {
        Self { max_gap_days: 5 }
    }
}

impl SeriesPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.max_gap_days < 1 {
            return Err(ForecastError::InvalidRequest(
                "max_gap_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for both forecasting strategies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub linear: LinearConfig,
    pub recurrent: RecurrentConfig,
    pub series: SeriesPolicy,
}

impl ForecastConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ForecastError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        self.linear.validate()?;
        self.recurrent.validate()?;
        self.series.validate()
    }
}
