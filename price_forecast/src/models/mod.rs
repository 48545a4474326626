//! Forecasting models for close-price series

use crate::data::CloseSeries;
use crate::error::{ForecastError, Result};
use crate::utils::{future_dates, horizon_end};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// One forecast step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDate,
    pub predicted_close: f64,
}

/// Forecast result: one point per horizon step, daily, after the last input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Stamp `values` with the days following `last_timestamp`
    pub fn from_values(last_timestamp: NaiveDate, values: Vec<f64>) -> Result<Self> {
        if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "Forecast step {} is not finite",
                bad + 1
            )));
        }

        let dates = future_dates(last_timestamp, values.len());
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidRequest(format!(
                "Horizon of {} days runs past the supported date range",
                values.len()
            )));
        }

        Ok(Self {
            points: dates
                .into_iter()
                .zip(values)
                .map(|(timestamp, predicted_close)| ForecastPoint {
                    timestamp,
                    predicted_close,
                })
                .collect(),
        })
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Get the forecasted values
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_close).collect()
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Get the number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    /// Calculate mean absolute error between forecast and actual values
    pub fn mean_absolute_error(&self, actual: &[f64]) -> Result<f64> {
        self.check_length(actual)?;
        let sum: f64 = self
            .points
            .iter()
            .zip(actual.iter())
            .map(|(p, a)| (p.predicted_close - a).abs())
            .sum();
        Ok(sum / self.points.len() as f64)
    }

    /// Calculate mean squared error between forecast and actual values
    pub fn mean_squared_error(&self, actual: &[f64]) -> Result<f64> {
        self.check_length(actual)?;
        let sum: f64 = self
            .points
            .iter()
            .zip(actual.iter())
            .map(|(p, a)| (p.predicted_close - a).powi(2))
            .sum();
        Ok(sum / self.points.len() as f64)
    }

    fn check_length(&self, actual: &[f64]) -> Result<()> {
        if self.points.is_empty() || self.points.len() != actual.len() {
            return Err(ForecastError::InvalidRequest(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                self.points.len(),
                actual.len()
            )));
        }
        Ok(())
    }
}

/// A model fitted to one series, ready to forecast from its end
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for the next `horizon` days
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a close series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit the model to `series`
    fn train(&self, series: &CloseSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;

    /// Fit to `series` and forecast `horizon` days past its end.
    ///
    /// The trained state lives only for this call.
    fn fit_and_forecast(&self, series: &CloseSeries, horizon: usize) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidRequest(
                "Horizon must be greater than zero".to_string(),
            ));
        }
        horizon_end(series.last_timestamp(), horizon)?;
        self.train(series)?.forecast(horizon)
    }
}

pub mod arima;
#[cfg(feature = "recurrent")]
pub mod lstm;
#[cfg(feature = "recurrent")]
pub mod network;

/// Whether the recurrent network backend is compiled into this build
pub fn recurrent_backend_available() -> bool {
    cfg!(feature = "recurrent")
}
