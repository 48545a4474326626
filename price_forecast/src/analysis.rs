//! Trend indicators and summary statistics over a price series
//!
//! Everything here is a pure function of its input series; results are
//! rebuilt on every call.

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use trade_math::moving_averages::{exponential_moving_average, simple_moving_average};

/// SMA and EMA of one window at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub window: usize,
    pub sma: f64,
    pub ema: f64,
}

/// A close with its moving averages, one entry per window in ascending order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDate,
    pub close: f64,
    pub averages: Vec<MovingAverages>,
}

impl TrendPoint {
    /// Averages for `window`, if it was requested
    pub fn window(&self, window: usize) -> Option<&MovingAverages> {
        self.averages.iter().find(|a| a.window == window)
    }
}

pub type TrendSeries = Vec<TrendPoint>;

/// Snapshot of the latest bar plus series-wide extremes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: i64,
}

/// OHLC bar for chart rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candlestick {
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Closes with SMA/EMA for each window.
///
/// Rows before the largest window has a full SMA are dropped, so the result
/// has `len - max(windows) + 1` rows. Duplicate windows are merged.
pub fn compute_trend(series: &PriceSeries, windows: &[usize]) -> Result<TrendSeries> {
    if series.is_empty() {
        return Err(ForecastError::EmptySeries(
            "Cannot compute moving averages of an empty series".to_string(),
        ));
    }

    let windows: BTreeSet<usize> = windows.iter().copied().collect();
    let largest = match windows.iter().next_back() {
        Some(&w) => w,
        None => {
            return Err(ForecastError::InvalidRequest(
                "At least one moving-average window is required".to_string(),
            ))
        }
    };
    if windows.contains(&0) {
        return Err(ForecastError::InvalidRequest(
            "Moving-average windows must be positive".to_string(),
        ));
    }
    if series.len() < largest {
        return Err(ForecastError::InsufficientData(format!(
            "A {}-day window needs at least {} observations, have {}",
            largest,
            largest,
            series.len()
        )));
    }

    let closes = series.closes();
    let mut columns = Vec::with_capacity(windows.len());
    for &window in &windows {
        let sma = simple_moving_average(&closes, window)?;
        let ema = exponential_moving_average(&closes, window)?;
        columns.push((window, sma, ema));
    }

    let trend = series
        .points()
        .iter()
        .enumerate()
        .skip(largest - 1)
        .map(|(i, point)| TrendPoint {
            timestamp: point.timestamp,
            close: point.close,
            averages: columns
                .iter()
                .filter_map(|(window, sma, ema)| {
                    sma[i].map(|sma| MovingAverages {
                        window: *window,
                        sma,
                        ema: ema[i],
                    })
                })
                .collect(),
        })
        .collect();

    Ok(trend)
}

/// Latest open/close/volume with the highest high and lowest low
pub fn compute_stats(series: &PriceSeries) -> Result<PriceStats> {
    let last = series.last().ok_or_else(|| {
        ForecastError::EmptySeries("Cannot compute stats of an empty series".to_string())
    })?;

    let (high, low) = series
        .points()
        .iter()
        .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), p| {
            (hi.max(p.high), lo.min(p.low))
        });

    Ok(PriceStats {
        open: last.open,
        close: last.close,
        high,
        low,
        volume: last.volume,
    })
}

/// OHLC bars in series order
pub fn candlesticks(series: &PriceSeries) -> Vec<Candlestick> {
    series
        .points()
        .iter()
        .map(|p| Candlestick {
            timestamp: p.timestamp,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
        })
        .collect()
}
