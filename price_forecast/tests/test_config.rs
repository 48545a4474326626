use price_forecast::config::{
    ForecastConfig, LinearConfig, RecurrentConfig, SeriesPolicy, TrendConfig, DEFAULT_HORIZON,
};
use price_forecast::ErrorKind;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = ForecastConfig::default();
    assert_eq!(config.linear, LinearConfig { order: 5, differencing: 1 });
    assert_eq!(config.recurrent.window_length, 60);
    assert_eq!(config.recurrent.epochs, 5);
    assert_eq!(config.recurrent.batch_size, 16);
    assert_eq!(config.recurrent.hidden_width, 50);
    assert_eq!(config.recurrent.layers, 2);
    assert_eq!(config.series, SeriesPolicy { max_gap_days: 5 });
    assert_eq!(TrendConfig::default().windows, vec![7, 21, 50]);
    assert_eq!(DEFAULT_HORIZON, 30);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config =
        ForecastConfig::from_json_str(r#"{"linear": {"order": 3}, "recurrent": {"epochs": 1}}"#)
            .unwrap();

    assert_eq!(config.linear.order, 3);
    assert_eq!(config.linear.differencing, 1);
    assert_eq!(config.recurrent.epochs, 1);
    assert_eq!(config.recurrent.window_length, 60);
    assert_eq!(config.series.max_gap_days, 5);
}

#[test]
fn test_invalid_values() {
    let err = ForecastConfig::from_json_str(r#"{"recurrent": {"layers": 0}}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    let config = RecurrentConfig {
        learning_rate: -0.1,
        ..RecurrentConfig::default()
    };
    assert!(config.validate().is_err());

    assert!(SeriesPolicy { max_gap_days: 0 }.validate().is_err());
}

#[test]
fn test_differencing_is_bounded() {
    let err = ForecastConfig::from_json_str(r#"{"linear": {"differencing": 18446744073709551615}}"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    let config = LinearConfig {
        order: 5,
        differencing: 3,
    };
    assert!(config.validate().is_err());
    assert!(LinearConfig { differencing: 2, ..config }.validate().is_ok());
}

#[test]
fn test_malformed_json() {
    let err = ForecastConfig::from_json_str("{ not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let err = ForecastConfig::from_json_str(r#"{"linear": {"order": "five"}}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"series": {{"max_gap_days": 8}}}}"#).unwrap();

    let config = ForecastConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.series.max_gap_days, 8);
    assert_eq!(config.linear, LinearConfig::default());

    let err = ForecastConfig::from_json_file("/no/such/config.json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
