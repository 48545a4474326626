use chrono::NaiveDate;
use price_forecast::analysis::{compute_stats, compute_trend};
use price_forecast::config::{ForecastConfig, RecurrentConfig};
use price_forecast::data::{PricePoint, PriceSeries};
use price_forecast::orchestrator::{ForecastOrchestrator, ForecastRequest, StrategyKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Price Forecast: Basic Forecasting Example");
    println!("=========================================\n");

    let prices = create_sample_daily_data(120)?;
    println!("Sample data created: {} daily points\n", prices.len());

    let stats = compute_stats(&prices)?;
    println!(
        "Latest close {:.2}, range {:.2} - {:.2}",
        stats.close, stats.low, stats.high
    );

    let trend = compute_trend(&prices, &[7, 21])?;
    if let Some(latest) = trend.last() {
        for averages in &latest.averages {
            println!(
                "  {}-day SMA {:.2}, EMA {:.2}",
                averages.window, averages.sma, averages.ema
            );
        }
    }

    // Smaller network than the default so the example finishes quickly
    let config = ForecastConfig {
        recurrent: RecurrentConfig {
            window_length: 20,
            epochs: 10,
            hidden_width: 16,
            ..RecurrentConfig::default()
        },
        ..ForecastConfig::default()
    };

    let orchestrator = ForecastOrchestrator::new();
    for strategy in [StrategyKind::Linear, StrategyKind::Recurrent] {
        let request =
            ForecastRequest::new(prices.close_series(), 5, strategy).with_config(config.clone());
        println!("\n{} forecast (5 days):", strategy);
        match orchestrator.forecast(&request) {
            Ok(forecast) => {
                for point in forecast.points() {
                    println!("  {}: {:.2}", point.timestamp, point.predicted_close);
                }
            }
            Err(failure) => println!("  failed: {}", failure),
        }
    }

    Ok(())
}

/// Create sample daily data with a trend and some seasonality
fn create_sample_daily_data(days: usize) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).ok_or("invalid start date")?;
    let points = start
        .iter_days()
        .take(days)
        .enumerate()
        .map(|(i, timestamp)| {
            let t = i as f64;
            let close = 100.0 + 0.2 * t + 4.0 * (t * 0.3).sin();
            PricePoint {
                timestamp,
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000 + (i as i64 % 7) * 150,
            }
        })
        .collect();
    Ok(PriceSeries::new(points)?)
}
