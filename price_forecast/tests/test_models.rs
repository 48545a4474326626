use approx::assert_abs_diff_eq;
use chrono::{Duration, NaiveDate};
use price_forecast::config::LinearConfig;
use price_forecast::data::CloseSeries;
use price_forecast::models::arima::ArimaModel;
use price_forecast::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use price_forecast::ForecastError;
use rstest::rstest;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

fn create_test_series(closes: &[f64]) -> CloseSeries {
    CloseSeries::from_daily_closes(start(), closes).unwrap()
}

/// Random walk with upward drift and deterministic pseudo-random steps
fn noisy_closes(len: usize) -> Vec<f64> {
    let mut price = 100.0;
    (0..len)
        .map(|t| {
            let noise = ((t as f64 * 12.9898).sin() * 43758.5453).fract() - 0.5;
            price += 0.3 + noise * 2.0;
            price
        })
        .collect()
}

fn assert_daily_after(result: &ForecastResult, last: NaiveDate, horizon: usize) {
    let timestamps = result.timestamps();
    assert_eq!(result.horizon(), horizon);
    assert_eq!(timestamps.len(), horizon);
    assert_eq!(timestamps[0], last + Duration::days(1));
    for pair in timestamps.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::days(1));
    }
}

#[test]
fn test_linear_trend_is_continued() {
    let closes: Vec<f64> = (0..90).map(|t| 100.0 + t as f64).collect();
    let series = create_test_series(&closes);

    let forecast = ArimaModel::default().fit_and_forecast(&series, 5).unwrap();

    assert_daily_after(&forecast, series.last_timestamp(), 5);
    assert_eq!(forecast.timestamps()[0], start() + Duration::days(90));
    let expected = [190.0, 191.0, 192.0, 193.0, 194.0];
    for (value, want) in forecast.values().iter().zip(expected) {
        assert_abs_diff_eq!(*value, want, epsilon = 1e-6);
    }
    assert_abs_diff_eq!(
        forecast.mean_absolute_error(&expected).unwrap(),
        0.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_linear_constant_series() {
    let series = create_test_series(&[100.0; 20]);
    let forecast = ArimaModel::default().fit_and_forecast(&series, 10).unwrap();

    for value in forecast.values() {
        assert_abs_diff_eq!(value, 100.0, epsilon = 1e-6);
    }
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(30)]
#[case(365)]
fn test_linear_forecast_cadence(#[case] horizon: usize) {
    let series = create_test_series(&noisy_closes(120));
    let forecast = ArimaModel::default()
        .fit_and_forecast(&series, horizon)
        .unwrap();

    assert_daily_after(&forecast, series.last_timestamp(), horizon);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_linear_needs_more_than_p_plus_d_observations() {
    let model = ArimaModel::from_config(&LinearConfig::default()).unwrap();
    let series = create_test_series(&noisy_closes(6));
    assert!(matches!(
        model.fit_and_forecast(&series, 3),
        Err(ForecastError::InsufficientData(_))
    ));

    let short = ArimaModel::new(2, 1).unwrap();
    assert_eq!(short.min_observations(), 4);
    let series = create_test_series(&noisy_closes(3));
    assert!(matches!(
        short.fit_and_forecast(&series, 1),
        Err(ForecastError::InsufficientData(_))
    ));
}

#[test]
fn test_zero_horizon_is_rejected_by_models() {
    let series = create_test_series(&noisy_closes(30));
    assert!(matches!(
        ArimaModel::default().fit_and_forecast(&series, 0),
        Err(ForecastError::InvalidRequest(_))
    ));
}

#[test]
fn test_trained_linear_model_forecasts_repeatably() {
    let series = create_test_series(&noisy_closes(80));
    let trained = ArimaModel::default().train(&series).unwrap();

    assert_eq!(trained.name(), "ARIMA(5,1,0)");
    assert_eq!(trained.coefficients().len(), 5);
    let short = trained.forecast(3).unwrap();
    let long = trained.forecast(10).unwrap();
    assert_eq!(short.values(), long.values()[..3].to_vec());
}

#[test]
fn test_linear_horizon_past_calendar_end() {
    let series = create_test_series(&noisy_closes(30));
    let model = ArimaModel::default();
    assert!(matches!(
        model.fit_and_forecast(&series, usize::MAX),
        Err(ForecastError::InvalidRequest(_))
    ));

    let trained = model.train(&series).unwrap();
    assert!(matches!(
        trained.forecast(usize::MAX),
        Err(ForecastError::InvalidRequest(_))
    ));
}

#[test]
fn test_linear_explosive_series_is_non_stationary() {
    let closes: Vec<f64> = (0..40).map(|t| 1.1f64.powi(t)).collect();
    let series = create_test_series(&closes);
    assert!(matches!(
        ArimaModel::default().train(&series),
        Err(ForecastError::ModelFit(_))
    ));
}

#[cfg(feature = "recurrent")]
mod recurrent {
    use super::*;
    use price_forecast::config::RecurrentConfig;
    use price_forecast::models::lstm::LstmModel;

    fn small_recurrent_config() -> RecurrentConfig {
        RecurrentConfig {
            window_length: 10,
            epochs: 3,
            batch_size: 8,
            hidden_width: 8,
            layers: 2,
            learning_rate: 0.005,
            seed: 7,
        }
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(100)]
    fn test_recurrent_insufficient_data_for_any_horizon(#[case] horizon: usize) {
        let config = small_recurrent_config();
        let model = LstmModel::new(config.clone()).unwrap();

        for len in [1, config.window_length - 1, config.window_length] {
            let series = create_test_series(&noisy_closes(len));
            assert!(matches!(
                model.fit_and_forecast(&series, horizon),
                Err(ForecastError::InsufficientData(_))
            ));
        }
    }

    #[test]
    fn test_recurrent_forecast_shape() {
        let series = create_test_series(&noisy_closes(40));
        let model = LstmModel::new(small_recurrent_config()).unwrap();
        let forecast = model.fit_and_forecast(&series, 6).unwrap();

        assert_daily_after(&forecast, series.last_timestamp(), 6);
        assert!(forecast.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_recurrent_minimum_length_trains() {
        // window_length + 1 observations give exactly one training window
        let config = small_recurrent_config();
        let series = create_test_series(&noisy_closes(config.window_length + 1));
        let trained = LstmModel::new(config).unwrap().train(&series).unwrap();
        assert_eq!(trained.epoch_losses().len(), 3);
    }

    #[test]
    fn test_recurrent_same_seed_same_forecast() {
        let series = create_test_series(&noisy_closes(40));
        let model = LstmModel::new(small_recurrent_config()).unwrap();

        let first = model.fit_and_forecast(&series, 5).unwrap();
        let second = model.fit_and_forecast(&series, 5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_recurrent_scaling_is_fit_on_input_only() {
        let closes = noisy_closes(40);
        let series = create_test_series(&closes);
        let trained = LstmModel::new(small_recurrent_config())
            .unwrap()
            .train(&series)
            .unwrap();

        let min = closes.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(trained.scaling().min(), min);
        assert_eq!(trained.scaling().max(), max);

        let scaled = trained.scaling().scale(&closes);
        assert!(scaled.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(trained.epoch_losses().iter().all(|l| l.is_finite()));
    }

    #[test]
    fn test_recurrent_rejects_invalid_config() {
        let config = RecurrentConfig {
            batch_size: 0,
            ..small_recurrent_config()
        };
        assert!(matches!(
            LstmModel::new(config),
            Err(ForecastError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_recurrent_divergence_is_model_fit() {
        let config = RecurrentConfig {
            learning_rate: 1e300,
            ..small_recurrent_config()
        };
        let series = create_test_series(&noisy_closes(40));
        assert!(matches!(
            LstmModel::new(config).unwrap().train(&series),
            Err(ForecastError::ModelFit(_))
        ));
    }

    #[test]
    fn test_recurrent_horizon_past_calendar_end() {
        let series = create_test_series(&noisy_closes(20));
        let trained = LstmModel::new(small_recurrent_config())
            .unwrap()
            .train(&series)
            .unwrap();
        assert!(matches!(
            trained.forecast(usize::MAX),
            Err(ForecastError::InvalidRequest(_))
        ));
    }
}
