//! # Stock Insight
//!
//! `stock_insight` bundles the workspace crates behind one dependency:
//!
//! - [`math`]: moving averages, differencing, autoregression and scaling
//! - [`forecast`]: price series, trend analysis and the forecasting orchestrator
//!
//! ## Example
//!
//! ```
//! use stock_insight::forecast::{ClosePoint, ForecastRequest, StrategyKind};
//! use stock_insight::forecast::orchestrator::forecast;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series: Vec<ClosePoint> = start
//!     .iter_days()
//!     .take(30)
//!     .enumerate()
//!     .map(|(i, timestamp)| ClosePoint { timestamp, close: 50.0 + i as f64 })
//!     .collect();
//!
//! let result = forecast(&ForecastRequest::new(series, 3, StrategyKind::Linear)).unwrap();
//! assert_eq!(result.horizon(), 3);
//! assert!((result.values()[0] - 80.0).abs() < 1e-6);
//! ```

pub use price_forecast as forecast;
pub use trade_math as math;

/// Whether forecasts with [`StrategyKind::Recurrent`](forecast::StrategyKind::Recurrent)
/// can run in this build.
pub fn recurrent_enabled() -> bool {
    forecast::recurrent_backend_available()
}
