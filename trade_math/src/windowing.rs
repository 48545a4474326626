//! Fixed-length input/target windows for sequence training

use crate::{MathError, Result};

/// One training pair: `length` consecutive values and the value right after them
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceWindow {
    pub input: Vec<f64>,
    pub target: f64,
}

/// Slice `values` into overlapping windows of `length`.
///
/// For every `i` in `length..values.len()` the window input is
/// `values[i - length..i]` and the target is `values[i]`, so `N` values yield
/// `N - length` windows in order.
pub fn sequence_windows(values: &[f64], length: usize) -> Result<Vec<SequenceWindow>> {
    if length == 0 {
        return Err(MathError::InvalidInput(
            "Window length must be greater than zero".to_string(),
        ));
    }
    if values.len() <= length {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} values to build a window, have {}",
            length,
            values.len()
        )));
    }

    Ok((length..values.len())
        .map(|i| SequenceWindow {
            input: values[i - length..i].to_vec(),
            target: values[i],
        })
        .collect())
}
