//! Moving average calculation implementations
//!
//! Contains streaming and batch implementations of:
//! - Simple Moving Average (SMA) over a trailing window of closes
//! - Exponential Moving Average (EMA) with span-style smoothing, seeded with
//!   the first observed value

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
        })
    }

    /// Push a new value into the trailing window
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }
    }

    /// Current average, or `None` until `period` values have been seen
    pub fn value(&self) -> Option<f64> {
        if self.values.len() < self.period {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.period as f64)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Exponential Moving Average (EMA) implementation
///
/// Uses `alpha = 2 / (period + 1)` and is seeded with the first value, so a
/// value is available from the very first update:
/// `ema_t = alpha * x_t + (1 - alpha) * ema_{t-1}`.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    period: usize,
    alpha: f64,
    current: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create a new Exponential Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            current: None,
        })
    }

    /// Fold a new value into the average
    pub fn update(&mut self, value: f64) {
        self.current = Some(match self.current {
            None => value,
            Some(previous) => self.alpha * value + (1.0 - self.alpha) * previous,
        });
    }

    /// Current average, `None` before the first update
    pub fn value(&self) -> Option<f64> {
        self.current
    }

    /// Smoothing factor in use
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the EMA, clearing all values
    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// SMA over a whole series, aligned with the input.
///
/// Entry `i` is `None` for the first `period - 1` positions.
pub fn simple_moving_average(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(period)?;
    Ok(values
        .iter()
        .map(|&v| {
            sma.update(v);
            sma.value()
        })
        .collect())
}

/// EMA over a whole series, aligned with the input
pub fn exponential_moving_average(values: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(period)?;
    let mut out = Vec::with_capacity(values.len());
    for &v in values {
        ema.update(v);
        if let Some(current) = ema.value() {
            out.push(current);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_calculation() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();

        assert!(sma.value().is_none());

        sma.update(2.0);
        sma.update(4.0);
        assert!(sma.value().is_none());

        sma.update(6.0);
        assert_eq!(sma.value(), Some(4.0));

        // The window slides, dropping the oldest value
        sma.update(8.0);
        assert_eq!(sma.value(), Some(6.0));
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let mut ema = ExponentialMovingAverage::new(3).unwrap();
        assert!(ema.value().is_none());

        ema.update(2.0);
        assert_eq!(ema.value(), Some(2.0));

        // alpha = 0.5
        ema.update(4.0);
        assert!((ema.value().unwrap() - 3.0).abs() < 1e-12);
        ema.update(6.0);
        assert!((ema.value().unwrap() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(SimpleMovingAverage::new(0).is_err());
        assert!(ExponentialMovingAverage::new(0).is_err());
        assert!(simple_moving_average(&[1.0], 0).is_err());
    }

    #[test]
    fn test_batch_sma_matches_brute_force() {
        let values: Vec<f64> = (0..40).map(|i| (i as f64 * 0.7).sin() * 10.0 + 50.0).collect();
        for period in 1..=12 {
            let sma = simple_moving_average(&values, period).unwrap();
            assert_eq!(sma.len(), values.len());
            for (i, value) in sma.iter().enumerate() {
                if i + 1 < period {
                    assert!(value.is_none());
                } else {
                    let slice = &values[i + 1 - period..=i];
                    let expected = slice.iter().sum::<f64>() / period as f64;
                    assert!((value.unwrap() - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_batch_ema_recurrence() {
        let values = [10.0, 20.0, 30.0, 40.0];
        let ema = exponential_moving_average(&values, 4).unwrap();
        let alpha = 2.0 / 5.0;

        assert_eq!(ema.len(), 4);
        assert_eq!(ema[0], 10.0);
        for i in 1..values.len() {
            let expected = alpha * values[i] + (1.0 - alpha) * ema[i - 1];
            assert!((ema[i] - expected).abs() < 1e-12);
        }
    }
}
