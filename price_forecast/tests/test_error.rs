use price_forecast::error::{ErrorKind, ForecastError};
use rstest::rstest;
use std::io;
use trade_math::MathError;

#[rstest]
#[case(ForecastError::EmptySeries("x".into()), ErrorKind::EmptySeries, "empty_series")]
#[case(ForecastError::InsufficientData("x".into()), ErrorKind::InsufficientData, "insufficient_data")]
#[case(ForecastError::InvalidRequest("x".into()), ErrorKind::InvalidRequest, "invalid_request")]
#[case(ForecastError::ModelFit("x".into()), ErrorKind::ModelFit, "model_fit")]
#[case(ForecastError::BackendUnavailable("x".into()), ErrorKind::BackendUnavailable, "backend_unavailable")]
#[case(ForecastError::DataFormat("x".into()), ErrorKind::DataFormat, "data_format")]
#[case(ForecastError::ConfigError("x".into()), ErrorKind::Config, "config")]
fn test_error_kinds(
    #[case] err: ForecastError,
    #[case] kind: ErrorKind,
    #[case] tag: &str,
) {
    assert_eq!(err.kind(), kind);
    assert_eq!(kind.as_str(), tag);
    assert_eq!(kind.to_string(), tag);
    assert_eq!(serde_json::to_value(kind).unwrap(), tag);
}

#[test]
fn test_error_display() {
    let err = ForecastError::InsufficientData("need 7 observations".to_string());
    assert_eq!(err.to_string(), "Insufficient data: need 7 observations");

    let err = ForecastError::ModelFit("not stationary".to_string());
    assert_eq!(err.to_string(), "Model fit error: not stationary");
}

#[test]
fn test_math_error_conversion() {
    let err: ForecastError = MathError::InsufficientData("short".into()).into();
    assert!(matches!(err, ForecastError::InsufficientData(ref m) if m == "short"));

    let err: ForecastError = MathError::InvalidInput("zero window".into()).into();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    let err: ForecastError = MathError::CalculationError("singular".into()).into();
    assert_eq!(err.kind(), ErrorKind::ModelFit);
}

#[test]
fn test_io_error_conversion() {
    fn open_missing() -> price_forecast::error::Result<String> {
        Ok(std::fs::read_to_string("/definitely/not/here.csv")?)
    }

    let err = open_missing().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    let err: ForecastError = io::Error::new(io::ErrorKind::Other, "disk").into();
    assert!(err.to_string().starts_with("IO error"));
}

#[test]
fn test_json_error_is_config_error() {
    let err: ForecastError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert_eq!(err.kind(), ErrorKind::Config);
}
