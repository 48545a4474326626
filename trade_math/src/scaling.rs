//! Min-max scaling to the unit interval

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Bounds of a fitted min-max transform.
///
/// Maps `[min, max]` onto `[0, 1]` and back. A constant series (`min == max`)
/// maps every value to `0.0` and inverts back to `min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    /// Fit the scaler to the observed range of `values`
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a scaler on an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Cannot fit a scaler on non-finite values".to_string(),
            ));
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Map a raw value into scaled space
    pub fn transform(&self, value: f64) -> f64 {
        let range = self.range();
        if range == 0.0 {
            0.0
        } else {
            (value - self.min) / range
        }
    }

    /// Map a scaled value back into raw units
    pub fn inverse_transform(&self, scaled: f64) -> f64 {
        scaled * self.range() + self.min
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    pub fn inverse_transform_all(&self, scaled: &[f64]) -> Vec<f64> {
        scaled.iter().map(|&v| self.inverse_transform(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_bounds_and_unit_range() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        let scaler = MinMaxScaler::fit(&values).unwrap();

        assert_eq!(scaler.min(), 10.0);
        assert_eq!(scaler.max(), 50.0);

        let scaled = scaler.transform_all(&values);
        assert_eq!(scaled[0], 0.0);
        assert_eq!(scaled[4], 1.0);
        assert!((scaled[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_restores_values() {
        let values = [101.5, 99.25, 104.0, 100.0];
        let scaler = MinMaxScaler::fit(&values).unwrap();
        let restored = scaler.inverse_transform_all(&scaler.transform_all(&values));

        for (a, b) in values.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_values_outside_fit_range_extrapolate() {
        let scaler = MinMaxScaler::fit(&[0.0, 10.0]).unwrap();
        assert!((scaler.transform(15.0) - 1.5).abs() < 1e-12);
        assert!((scaler.inverse_transform(-0.5) + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series() {
        let scaler = MinMaxScaler::fit(&[7.0, 7.0, 7.0]).unwrap();
        assert_eq!(scaler.transform(7.0), 0.0);
        assert_eq!(scaler.inverse_transform(0.3), 7.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            MinMaxScaler::fit(&[]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            MinMaxScaler::fit(&[1.0, f64::NAN]),
            Err(MathError::InvalidInput(_))
        ));
    }
}
