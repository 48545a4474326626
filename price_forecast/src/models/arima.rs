//! ARIMA(p, d, 0) model for close-price forecasting
//!
//! The series is differenced `d` times, an AR(p) with mean is fitted to the
//! result by conditional least squares, and forecasts are produced by
//! recursive substitution and integrated back to price levels.

use crate::config::{LinearConfig, MAX_DIFFERENCING};
use crate::data::CloseSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::utils::horizon_end;
use chrono::NaiveDate;
use trade_math::{difference, AutoRegression, Differenced};

/// ARIMA model with no moving-average terms
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// p + d + 1
    min_observations: usize,
}

/// ARIMA model fitted to one series
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    name: String,
    autoregression: AutoRegression,
    differenced: Differenced,
    last_timestamp: NaiveDate,
}

impl ArimaModel {
    /// Create a new ARIMA(p, d, 0) model
    pub fn new(p: usize, d: usize) -> Result<Self> {
        if p == 0 {
            return Err(ForecastError::InvalidRequest(
                "AR order must be greater than zero".to_string(),
            ));
        }

        if d > MAX_DIFFERENCING {
            return Err(ForecastError::InvalidRequest(format!(
                "Differencing order {} exceeds the maximum of {}",
                d, MAX_DIFFERENCING
            )));
        }
        let min_observations = p
            .checked_add(d)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| {
                ForecastError::InvalidRequest(format!("AR order {} is too large", p))
            })?;

        Ok(Self {
            name: format!("ARIMA({},{},0)", p, d),
            p,
            d,
            min_observations,
        })
    }

    pub fn from_config(config: &LinearConfig) -> Result<Self> {
        Self::new(config.order, config.differencing)
    }

    /// Observations needed before a fit is possible
    pub fn min_observations(&self) -> usize {
        self.min_observations
    }
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self {
            name: "ARIMA(5,1,0)".to_string(),
            p: 5,
            d: 1,
            min_observations: 7,
        }
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, series: &CloseSeries) -> Result<TrainedArimaModel> {
        let closes = series.closes();
        if closes.len() < self.min_observations() {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs at least {} observations, have {}",
                self.name,
                self.min_observations(),
                closes.len()
            )));
        }

        let differenced = difference(&closes, self.d)?;
        let autoregression = AutoRegression::fit(&differenced.values, self.p)?;

        if !autoregression.is_stationary() {
            return Err(ForecastError::ModelFit(format!(
                "{} fit is non-stationary (coefficients {:?}); the differenced series is too close to a unit root",
                self.name,
                autoregression.coefficients()
            )));
        }

        log::debug!(
            "{} fitted: mean={:.6} coefficients={:?} sigma2={:.6}",
            self.name,
            autoregression.mean(),
            autoregression.coefficients(),
            autoregression.residual_variance()
        );

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            autoregression,
            differenced,
            last_timestamp: series.last_timestamp(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    /// Fitted AR coefficients on the differenced scale, lag 1 first
    pub fn coefficients(&self) -> &[f64] {
        self.autoregression.coefficients()
    }

    /// Mean of the differenced series (the drift when `d = 1`)
    pub fn drift(&self) -> f64 {
        self.autoregression.mean()
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        horizon_end(self.last_timestamp, horizon)?;
        let steps = self
            .autoregression
            .forecast(&self.differenced.values, horizon)?;
        let levels = self.differenced.integrate(&steps);
        ForecastResult::from_values(self.last_timestamp, levels)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
