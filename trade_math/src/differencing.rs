//! Differencing and re-integration of series

use crate::{MathError, Result};

/// A series differenced `order` times, plus what is needed to undo it
#[derive(Debug, Clone, PartialEq)]
pub struct Differenced {
    /// The differenced values (`len - order` of them)
    pub values: Vec<f64>,
    /// Last value of each intermediate series, lowest order first.
    /// `tails[k]` is the final value after `k` differencing passes.
    pub tails: Vec<f64>,
}

impl Differenced {
    pub fn order(&self) -> usize {
        self.tails.len()
    }

    /// Turn forecasts made on the differenced scale back into levels,
    /// continuing from the end of the original series.
    pub fn integrate(&self, forecasts: &[f64]) -> Vec<f64> {
        let mut current = forecasts.to_vec();
        for &tail in self.tails.iter().rev() {
            let mut level = tail;
            for value in current.iter_mut() {
                level += *value;
                *value = level;
            }
        }
        current
    }
}

/// Apply `order` passes of first differencing: `y_t = x_t - x_{t-1}`
pub fn difference(values: &[f64], order: usize) -> Result<Differenced> {
    if values.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Differencing of order {} needs more than {} values, have {}",
            order,
            order,
            values.len()
        )));
    }

    let mut current = values.to_vec();
    let mut tails = Vec::with_capacity(order);
    for _ in 0..order {
        // len > order guarantees a last element on every pass
        if let Some(&last) = current.last() {
            tails.push(last);
        }
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }

    Ok(Differenced {
        values: current,
        tails,
    })
}
