//! Recurrent (LSTM) sequence model for close-price forecasting
//!
//! Closes are min-max scaled to `[0, 1]` using bounds fitted on the input
//! series alone, cut into fixed-length windows, and used to train a small
//! stacked LSTM. Forecasting rolls a window forward, feeding each prediction
//! back as the newest input, so errors compound with the horizon.

use crate::config::RecurrentConfig;
use crate::data::CloseSeries;
use crate::error::{ForecastError, Result};
use crate::models::network::{LstmNetwork, TrainOptions};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::utils::horizon_end;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use trade_math::{sequence_windows, MinMaxScaler};

/// Scaler bounds fitted for one forecast call.
///
/// Not `Clone`: owned by exactly one trained model.
#[derive(Debug, PartialEq)]
pub struct ScalingContext {
    scaler: MinMaxScaler,
}

impl ScalingContext {
    fn fit(values: &[f64]) -> Result<Self> {
        Ok(Self {
            scaler: MinMaxScaler::fit(values)?,
        })
    }

    pub fn min(&self) -> f64 {
        self.scaler.min()
    }

    pub fn max(&self) -> f64 {
        self.scaler.max()
    }

    pub fn scale(&self, values: &[f64]) -> Vec<f64> {
        self.scaler.transform_all(values)
    }

    pub fn unscale(&self, values: &[f64]) -> Vec<f64> {
        self.scaler.inverse_transform_all(values)
    }
}

/// LSTM forecasting model
#[derive(Debug, Clone)]
pub struct LstmModel {
    name: String,
    config: RecurrentConfig,
}

/// LSTM model trained on one series
#[derive(Debug)]
pub struct TrainedLstmModel {
    name: String,
    network: LstmNetwork,
    scaling: ScalingContext,
    /// Last `window_length` scaled closes, the seed of the rollout
    seed_window: Vec<f64>,
    last_timestamp: NaiveDate,
    epoch_losses: Vec<f64>,
}

impl LstmModel {
    /// Create a new LSTM model from validated settings
    pub fn new(config: RecurrentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: format!(
                "LSTM({}x{}, window={})",
                config.layers, config.hidden_width, config.window_length
            ),
            config,
        })
    }

    pub fn config(&self) -> &RecurrentConfig {
        &self.config
    }
}

impl ForecastModel for LstmModel {
    type Trained = TrainedLstmModel;

    fn train(&self, series: &CloseSeries) -> Result<TrainedLstmModel> {
        let window_length = self.config.window_length;
        let closes = series.closes();
        if closes.len() <= window_length {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs more than {} observations, have {}",
                self.name,
                window_length,
                closes.len()
            )));
        }

        let scaling = ScalingContext::fit(&closes)?;
        let scaled = scaling.scale(&closes);
        let windows = sequence_windows(&scaled, window_length)?;

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut network =
            LstmNetwork::new(self.config.layers, self.config.hidden_width, &mut rng);
        let options = TrainOptions {
            epochs: self.config.epochs,
            batch_size: self.config.batch_size,
            learning_rate: self.config.learning_rate,
        };

        log::debug!(
            "Training {} on {} windows for {} epochs",
            self.name,
            windows.len(),
            options.epochs
        );
        let epoch_losses = network.train(&windows, &options, &mut rng)?;

        Ok(TrainedLstmModel {
            name: self.name.clone(),
            network,
            scaling,
            seed_window: scaled[scaled.len() - window_length..].to_vec(),
            last_timestamp: series.last_timestamp(),
            epoch_losses,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedLstmModel {
    pub fn scaling(&self) -> &ScalingContext {
        &self.scaling
    }

    /// Training loss of each epoch, in scaled units
    pub fn epoch_losses(&self) -> &[f64] {
        &self.epoch_losses
    }

    /// Autoregressive rollout in scaled units
    fn rollout(&self, horizon: usize) -> Result<Vec<f64>> {
        let mut window: VecDeque<f64> = self.seed_window.iter().copied().collect();
        let mut predictions = Vec::with_capacity(horizon);

        for step in 0..horizon {
            let input: Vec<f64> = window.iter().copied().collect();
            let next = self.network.predict(&input);
            if !next.is_finite() {
                return Err(ForecastError::ModelFit(format!(
                    "Prediction at step {} is not finite",
                    step + 1
                )));
            }
            window.pop_front();
            window.push_back(next);
            predictions.push(next);
        }

        Ok(predictions)
    }
}

impl TrainedForecastModel for TrainedLstmModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        horizon_end(self.last_timestamp, horizon)?;
        let scaled = self.rollout(horizon)?;
        ForecastResult::from_values(self.last_timestamp, self.scaling.unscale(&scaled))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
