//! Autoregressive model estimation
//!
//! Fits `x_t - mu = sum_i phi_i (x_{t-i} - mu) + e_t` by conditional least
//! squares, which coincides with conditional maximum likelihood under
//! Gaussian errors.

use crate::{MathError, Result};

/// Relative ridge term added to the normal equations. Keeps degenerate
/// inputs (constant or perfectly collinear lags) solvable with a
/// minimum-norm answer instead of failing.
const RIDGE: f64 = 1e-8;

/// Fitted autoregression of a fixed order
#[derive(Debug, Clone, PartialEq)]
pub struct AutoRegression {
    mean: f64,
    coefficients: Vec<f64>,
    residual_variance: f64,
}

impl AutoRegression {
    /// Fit an AR(`order`) model to `values`.
    ///
    /// Requires `values.len() > order` so at least one regression row exists.
    pub fn fit(values: &[f64], order: usize) -> Result<Self> {
        if order == 0 {
            return Err(MathError::InvalidInput(
                "Autoregressive order must be greater than zero".to_string(),
            ));
        }
        if values.len() <= order {
            return Err(MathError::InsufficientData(format!(
                "AR({}) needs more than {} observations, have {}",
                order,
                order,
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Series contains non-finite values".to_string(),
            ));
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let centered: Vec<f64> = values.iter().map(|v| v - mean).collect();

        let mut xtx = vec![vec![0.0; order]; order];
        let mut xty = vec![0.0; order];
        for t in order..centered.len() {
            let target = centered[t];
            for i in 0..order {
                let lag_i = centered[t - 1 - i];
                xty[i] += lag_i * target;
                for j in 0..order {
                    xtx[i][j] += lag_i * centered[t - 1 - j];
                }
            }
        }

        let trace: f64 = (0..order).map(|i| xtx[i][i]).sum();
        let ridge = RIDGE * (trace / order as f64).max(1.0);
        for (i, row) in xtx.iter_mut().enumerate() {
            row[i] += ridge;
        }

        let coefficients = solve_linear_system(xtx, xty)?;

        let rows = centered.len() - order;
        let sse: f64 = (order..centered.len())
            .map(|t| {
                let fitted: f64 = coefficients
                    .iter()
                    .enumerate()
                    .map(|(i, phi)| phi * centered[t - 1 - i])
                    .sum();
                (centered[t] - fitted).powi(2)
            })
            .sum();

        Ok(Self {
            mean,
            coefficients,
            residual_variance: sse / rows as f64,
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// AR coefficients, lag 1 first
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Whether the fitted lag polynomial has all roots outside the unit circle
    pub fn is_stationary(&self) -> bool {
        is_stationary(&self.coefficients)
    }

    /// Mean forecast for the next `horizon` steps by recursive substitution.
    ///
    /// `history` is on the same scale the model was fit on; only its last
    /// `order` values are used.
    pub fn forecast(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>> {
        let order = self.order();
        if history.len() < order {
            return Err(MathError::InsufficientData(format!(
                "Forecasting with AR({}) needs {} history values, have {}",
                order,
                order,
                history.len()
            )));
        }

        let mut window: Vec<f64> = history[history.len() - order..]
            .iter()
            .map(|v| v - self.mean)
            .collect();
        let mut forecasts = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let next: f64 = self
                .coefficients
                .iter()
                .zip(window.iter().rev())
                .map(|(phi, lag)| phi * lag)
                .sum();
            window.remove(0);
            window.push(next);
            forecasts.push(next + self.mean);
        }

        Ok(forecasts)
    }
}

/// Stationarity test for AR coefficients (lag 1 first).
///
/// Runs the Levinson-Durbin recursion backwards to recover the partial
/// autocorrelations; the process is stationary iff each has magnitude < 1.
pub fn is_stationary(coefficients: &[f64]) -> bool {
    if coefficients.iter().any(|c| !c.is_finite()) {
        return false;
    }

    let mut current = coefficients.to_vec();
    while let Some(&reflection) = current.last() {
        if reflection.abs() >= 1.0 {
            return false;
        }
        let k = current.len();
        let denom = 1.0 - reflection * reflection;
        current = (0..k - 1)
            .map(|j| (current[j] + reflection * current[k - 2 - j]) / denom)
            .collect();
    }
    true
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a {}x{} system matrix",
            n, n
        )));
    }

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        let pivot = a[pivot_row][col];
        if !pivot.is_finite() || pivot.abs() <= f64::EPSILON * scale {
            return Err(MathError::CalculationError(format!(
                "Singular system: pivot {:e} in column {}",
                pivot, col
            )));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(MathError::CalculationError(
            "Solution contains non-finite values".to_string(),
        ));
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_small_system() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![3.0, 5.0];
        let x = solve_linear_system(a, b).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        let a = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let x = solve_linear_system(a, vec![2.0, 3.0]).unwrap();
        assert_eq!(x, vec![3.0, 2.0]);
    }

    #[test]
    fn test_singular_system() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(matches!(
            solve_linear_system(a, vec![1.0, 2.0]),
            Err(MathError::CalculationError(_))
        ));
    }

    #[test]
    fn test_recovers_ar1_coefficient() {
        // AR(1) with phi = 0.6 driven by hashed pseudo-noise
        let mut values = vec![0.0];
        for t in 1..400 {
            let shock = ((t as f64 * 12.9898).sin() * 43758.5453).fract() - 0.5;
            let prev = values[t - 1];
            values.push(0.6 * prev + shock);
        }
        let model = AutoRegression::fit(&values, 1).unwrap();
        assert!((model.coefficients()[0] - 0.6).abs() < 0.1);
        assert!(model.is_stationary());
    }

    #[test]
    fn test_constant_series_forecasts_mean() {
        let values = vec![3.0; 20];
        let model = AutoRegression::fit(&values, 5).unwrap();
        assert!(model.coefficients().iter().all(|c| c.abs() < 1e-9));

        let forecast = model.forecast(&values, 4).unwrap();
        for value in forecast {
            assert!((value - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fit_preconditions() {
        assert!(matches!(
            AutoRegression::fit(&[1.0, 2.0], 2),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            AutoRegression::fit(&[1.0, 2.0, 3.0], 0),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            AutoRegression::fit(&[1.0, f64::INFINITY, 3.0], 1),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_stationarity_check() {
        assert!(is_stationary(&[0.5]));
        assert!(!is_stationary(&[1.0]));
        assert!(!is_stationary(&[1.2, -0.1]));
        assert!(is_stationary(&[0.5, 0.3]));
        // phi1 + phi2 = 1 sits on the unit circle
        assert!(!is_stationary(&[0.5, 0.5]));
        assert!(is_stationary(&[]));
    }

    #[test]
    fn test_forecast_needs_history() {
        let values: Vec<f64> = (0..10).map(|t| (t as f64).cos()).collect();
        let model = AutoRegression::fit(&values, 3).unwrap();
        assert!(matches!(
            model.forecast(&values[..2], 1),
            Err(MathError::InsufficientData(_))
        ));
        assert_eq!(model.forecast(&values, 6).unwrap().len(), 6);
    }
}
