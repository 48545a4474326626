//! Strategy selection and the uniform forecast entry point
//!
//! A request moves through
//! `Received -> Validating -> {LinearRunning | RecurrentRunning} -> {Succeeded | Failed}`;
//! a request that fails validation goes straight to `Failed` without
//! running a model. Every error, whichever stage raised it, leaves as a
//! [`FailureResult`]. Nothing is retried.

use crate::config::ForecastConfig;
use crate::data::{ClosePoint, CloseSeries};
use crate::error::{ErrorKind, ForecastError, Result};
use crate::models::arima::ArimaModel;
use crate::models::{ForecastModel, ForecastResult};
use crate::utils::horizon_end;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model family to forecast with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// ARIMA(p, d, 0)
    Linear,
    /// Stacked LSTM
    Recurrent,
}

impl FromStr for StrategyKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "linear" | "arima" => Ok(StrategyKind::Linear),
            "recurrent" | "lstm" => Ok(StrategyKind::Recurrent),
            other => Err(ForecastError::InvalidRequest(format!(
                "Unknown strategy '{}', expected 'linear' or 'recurrent'",
                other
            ))),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Linear => f.write_str("linear"),
            StrategyKind::Recurrent => f.write_str("recurrent"),
        }
    }
}

/// Everything needed to produce one forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub series: Vec<ClosePoint>,
    /// Steps to forecast; must be positive
    pub horizon: i64,
    pub strategy: StrategyKind,
    #[serde(default)]
    pub config: ForecastConfig,
}

impl ForecastRequest {
    /// Request with the default configuration
    pub fn new(series: Vec<ClosePoint>, horizon: i64, strategy: StrategyKind) -> Self {
        Self {
            series,
            horizon,
            strategy,
            config: ForecastConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }
}

/// Structured failure handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResult {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<ForecastError> for FailureResult {
    fn from(err: ForecastError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FailureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Lifecycle of one forecast request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastState {
    Received,
    Validating,
    LinearRunning,
    RecurrentRunning,
    Succeeded,
    Failed,
}

/// Outcome of a request together with the states it passed through
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRun {
    pub states: Vec<ForecastState>,
    pub outcome: std::result::Result<ForecastResult, FailureResult>,
}

impl ForecastRun {
    pub fn final_state(&self) -> ForecastState {
        self.states
            .last()
            .copied()
            .unwrap_or(ForecastState::Received)
    }
}

/// Stateless dispatcher from [`StrategyKind`] to a forecasting model
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastOrchestrator;

impl ForecastOrchestrator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `request`, run the selected strategy and return its forecast
    pub fn forecast(
        &self,
        request: &ForecastRequest,
    ) -> std::result::Result<ForecastResult, FailureResult> {
        self.run(request).outcome
    }

    /// Like [`forecast`](Self::forecast), also reporting the state trail
    pub fn run(&self, request: &ForecastRequest) -> ForecastRun {
        let mut states = vec![ForecastState::Received];
        let mut enter = |state: ForecastState| {
            log::debug!("forecast request -> {:?}", state);
            states.push(state);
        };

        enter(ForecastState::Validating);
        let result = match validate(request) {
            Ok((series, horizon)) => {
                enter(match request.strategy {
                    StrategyKind::Linear => ForecastState::LinearRunning,
                    StrategyKind::Recurrent => ForecastState::RecurrentRunning,
                });
                dispatch(request.strategy, &request.config, &series, horizon)
            }
            Err(err) => Err(err),
        };

        let outcome = match result {
            Ok(forecast) => {
                enter(ForecastState::Succeeded);
                Ok(forecast)
            }
            Err(err) => {
                log::warn!("{} forecast failed: {}", request.strategy, err);
                enter(ForecastState::Failed);
                Err(FailureResult::from(err))
            }
        };

        ForecastRun { states, outcome }
    }
}

/// Convenience entry point using a default orchestrator
pub fn forecast(request: &ForecastRequest) -> std::result::Result<ForecastResult, FailureResult> {
    ForecastOrchestrator::new().forecast(request)
}

fn validate(request: &ForecastRequest) -> Result<(CloseSeries, usize)> {
    if request.horizon <= 0 {
        return Err(ForecastError::InvalidRequest(format!(
            "Horizon must be positive, got {}",
            request.horizon
        )));
    }
    if request.series.is_empty() {
        return Err(ForecastError::InvalidRequest(
            "Series must not be empty".to_string(),
        ));
    }
    request.config.validate()?;

    let horizon = usize::try_from(request.horizon).map_err(|_| {
        ForecastError::InvalidRequest(format!("Horizon {} is too large", request.horizon))
    })?;

    let series = CloseSeries::new(request.series.clone()).map_err(|err| match err {
        ForecastError::InvalidRequest(_) => err,
        other => ForecastError::InvalidRequest(other.to_string()),
    })?;

    horizon_end(series.last_timestamp(), horizon)?;

    let max_gap = request.config.series.max_gap_days;
    if series.max_gap_days() > max_gap {
        return Err(ForecastError::InvalidRequest(format!(
            "Series is not daily: {} day gap between observations exceeds {}",
            series.max_gap_days(),
            max_gap
        )));
    }

    Ok((series, horizon))
}

fn dispatch(
    strategy: StrategyKind,
    config: &ForecastConfig,
    series: &CloseSeries,
    horizon: usize,
) -> Result<ForecastResult> {
    match strategy {
        StrategyKind::Linear => {
            ArimaModel::from_config(&config.linear)?.fit_and_forecast(series, horizon)
        }
        StrategyKind::Recurrent => run_recurrent(config, series, horizon),
    }
}

#[cfg(feature = "recurrent")]
fn run_recurrent(
    config: &ForecastConfig,
    series: &CloseSeries,
    horizon: usize,
) -> Result<ForecastResult> {
    crate::models::lstm::LstmModel::new(config.recurrent.clone())?
        .fit_and_forecast(series, horizon)
}

#[cfg(not(feature = "recurrent"))]
fn run_recurrent(
    _config: &ForecastConfig,
    _series: &CloseSeries,
    _horizon: usize,
) -> Result<ForecastResult> {
    Err(ForecastError::BackendUnavailable(
        "this build has no recurrent network backend; enable the `recurrent` feature"
            .to_string(),
    ))
}
