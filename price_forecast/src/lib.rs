//! # Price Forecast
//!
//! Trend analysis and multi-step forecasting of daily closing prices.
//!
//! ## Features
//!
//! - OHLCV series handling and CSV loading
//! - Trend indicators (SMA/EMA per window) and summary statistics
//! - Two interchangeable forecasting strategies:
//!   - **Linear**: ARIMA(p, d, 0) fitted on the raw close series
//!   - **Recurrent**: stacked LSTM trained on scaled, windowed closes
//!     (behind the default `recurrent` feature)
//! - A single orchestrator entry point with structured failures
//!
//! Models are fitted from scratch on every call; nothing trained outlives
//! the request that produced it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use price_forecast::analysis::{compute_stats, compute_trend};
//! use price_forecast::data::DataLoader;
//! use price_forecast::orchestrator::{ForecastOrchestrator, ForecastRequest, StrategyKind};
//!
//! let prices = DataLoader::from_csv("prices.csv")?;
//!
//! let stats = compute_stats(&prices)?;
//! let trend = compute_trend(&prices, &[7, 21, 50])?;
//!
//! let request = ForecastRequest::new(prices.close_series(), 30, StrategyKind::Linear);
//! match ForecastOrchestrator::new().forecast(&request) {
//!     Ok(forecast) => println!("{:?}", forecast.values()),
//!     Err(failure) => eprintln!("{}: {}", failure.kind, failure.message),
//! }
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod analysis;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod utils;

// Re-export commonly used types
pub use crate::analysis::{compute_stats, compute_trend, PriceStats, TrendPoint, TrendSeries};
pub use crate::cache::ForecastCache;
pub use crate::config::{ForecastConfig, LinearConfig, RecurrentConfig, TrendConfig};
pub use crate::data::{ClosePoint, CloseSeries, DataLoader, PricePoint, PriceSeries};
pub use crate::error::{ErrorKind, ForecastError};
pub use crate::models::{
    recurrent_backend_available, ForecastModel, ForecastPoint, ForecastResult,
    TrainedForecastModel,
};
pub use crate::orchestrator::{
    forecast, FailureResult, ForecastOrchestrator, ForecastRequest, ForecastState, StrategyKind,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
