//! Command line front end: trend analysis and forecasts for a CSV of daily prices

use clap::{Parser, Subcommand};
use price_forecast::analysis::{candlesticks, compute_stats, compute_trend};
use price_forecast::config::{ForecastConfig, DEFAULT_HORIZON, DEFAULT_TREND_WINDOWS};
use price_forecast::data::DataLoader;
use price_forecast::orchestrator::{
    FailureResult, ForecastOrchestrator, ForecastRequest, StrategyKind,
};
use price_forecast::ForecastError;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "price-forecast", version, about = "Trend analysis and price forecasting")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print latest stats, moving averages and candlesticks as JSON
    Analyze {
        /// CSV with date,open,high,low,close,volume columns
        #[arg(long)]
        csv: PathBuf,
        /// Moving-average windows
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_TREND_WINDOWS.to_vec())]
        windows: Vec<usize>,
    },
    /// Forecast future closes and print them as JSON
    Forecast {
        #[arg(long)]
        csv: PathBuf,
        /// linear (ARIMA) or recurrent (LSTM)
        #[arg(long, default_value = "linear")]
        model: StrategyKind,
        /// Number of days to forecast
        #[arg(long, default_value_t = DEFAULT_HORIZON, allow_negative_numbers = true)]
        periods: i64,
        /// JSON file overriding model settings
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => log::error!("Failed to encode output: {}", e),
    }
}

fn print_failure(failure: &FailureResult) -> ExitCode {
    print_json(&json!({ "error": failure }));
    ExitCode::FAILURE
}

fn analyze(csv: &Path, windows: &[usize]) -> Result<serde_json::Value, ForecastError> {
    let prices = DataLoader::from_csv(csv)?;
    let stats = compute_stats(&prices)?;
    let trend = compute_trend(&prices, windows)?;
    Ok(json!({
        "stats": stats,
        "trend": trend,
        "candlesticks": candlesticks(&prices),
    }))
}

fn forecast(
    csv: &Path,
    model: StrategyKind,
    periods: i64,
    config: Option<&Path>,
) -> Result<serde_json::Value, FailureResult> {
    let prices = DataLoader::from_csv(csv)?;
    let config = match config {
        Some(path) => ForecastConfig::from_json_file(path)?,
        None => ForecastConfig::default(),
    };

    let request = ForecastRequest::new(prices.close_series(), periods, model).with_config(config);
    let forecast = ForecastOrchestrator::new().forecast(&request)?;
    Ok(json!({ "forecast": forecast }))
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    log::debug!("Parsed arguments: {:?}", cli);

    match cli.command {
        Command::Analyze { csv, windows } => match analyze(&csv, &windows) {
            Ok(output) => {
                print_json(&output);
                ExitCode::SUCCESS
            }
            Err(e) => print_failure(&FailureResult::from(e)),
        },
        Command::Forecast {
            csv,
            model,
            periods,
            config,
        } => {
            log::info!("Forecasting {} days with the {} model", periods, model);
            match forecast(&csv, model, periods, config.as_deref()) {
                Ok(output) => {
                    print_json(&output);
                    ExitCode::SUCCESS
                }
                Err(failure) => print_failure(&failure),
            }
        }
    }
}
