//! Utility functions for the price_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};

/// The `horizon` calendar days strictly after `last`, one day apart.
///
/// No weekend or holiday skipping: forecasts keep a plain daily cadence.
/// Stops early if the calendar runs out.
pub fn future_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as u64)
        .map_while(|offset| last.checked_add_days(Days::new(offset)))
        .collect()
}

/// Last forecast date for `horizon` days after `last`.
///
/// Fails with `InvalidRequest` when that date is not representable, before
/// any model work is done for the horizon.
pub fn horizon_end(last: NaiveDate, horizon: usize) -> Result<NaiveDate> {
    u64::try_from(horizon)
        .ok()
        .and_then(|days| last.checked_add_days(Days::new(days)))
        .ok_or_else(|| {
            ForecastError::InvalidRequest(format!(
                "Horizon of {} days after {} runs past the supported date range",
                horizon, last
            ))
        })
}
