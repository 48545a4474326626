//! Price series types and CSV loading

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// One daily OHLCV observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Ordered OHLCV observations with strictly increasing timestamps.
///
/// May be empty; operations that need data report [`ForecastError::EmptySeries`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        ensure_increasing(points.iter().map(|p| p.timestamp))?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// The `(timestamp, close)` pairs a forecast request is built from
    pub fn close_series(&self) -> Vec<ClosePoint> {
        self.points
            .iter()
            .map(|p| ClosePoint {
                timestamp: p.timestamp,
                close: p.close,
            })
            .collect()
    }

    /// Write the series as `date,open,high,low,close,volume` CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["date", "open", "high", "low", "close", "volume"])?;
        for p in &self.points {
            csv_writer.write_record([
                p.timestamp.format("%Y-%m-%d").to_string(),
                p.open.to_string(),
                p.high.to_string(),
                p.low.to_string(),
                p.close.to_string(),
                p.volume.to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// A single close observation, the unit of forecasting input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosePoint {
    pub timestamp: NaiveDate,
    pub close: f64,
}

/// Validated, non-empty close series handed to forecasting models
#[derive(Debug, Clone, PartialEq)]
pub struct CloseSeries {
    points: Vec<ClosePoint>,
}

impl CloseSeries {
    /// Build a series from close points.
    ///
    /// Fails with `EmptySeries` for no points and `InvalidRequest` for
    /// non-increasing timestamps or non-finite closes.
    pub fn new(points: Vec<ClosePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::EmptySeries(
                "Close series has no observations".to_string(),
            ));
        }
        ensure_increasing(points.iter().map(|p| p.timestamp))?;
        if let Some(bad) = points.iter().find(|p| !p.close.is_finite()) {
            return Err(ForecastError::InvalidRequest(format!(
                "Non-finite close on {}",
                bad.timestamp
            )));
        }
        Ok(Self { points })
    }

    /// Build a series from consecutive daily closes starting at `start`
    pub fn from_daily_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let points = start
            .iter_days()
            .zip(closes.iter())
            .map(|(timestamp, &close)| ClosePoint { timestamp, close })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[ClosePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last_timestamp(&self) -> NaiveDate {
        // non-empty by construction
        self.points[self.points.len() - 1].timestamp
    }

    /// Largest gap in days between consecutive observations (0 for one point)
    pub fn max_gap_days(&self) -> i64 {
        self.points
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_days())
            .max()
            .unwrap_or(0)
    }
}

fn ensure_increasing<I: Iterator<Item = NaiveDate>>(timestamps: I) -> Result<()> {
    let mut previous: Option<NaiveDate> = None;
    for ts in timestamps {
        if let Some(prev) = previous {
            if ts <= prev {
                return Err(ForecastError::InvalidRequest(format!(
                    "Timestamps must be strictly increasing: {} follows {}",
                    ts, prev
                )));
            }
        }
        previous = Some(ts);
    }
    Ok(())
}

/// Data loader for OHLCV CSV files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a price series from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a price series from any CSV source.
    ///
    /// Expects a header row naming `date`, `open`, `high`, `low`, `close` and
    /// `volume` columns in any order and case; other columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<PriceSeries> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = Columns::detect(&headers)?;

        let mut points = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            points.push(columns.parse(&record, row + 1)?);
        }

        log::debug!("Loaded {} rows of OHLCV data", points.len());
        PriceSeries::new(points)
    }
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn detect(headers: &csv::StringRecord) -> Result<Self> {
        let find = |names: &[&str]| -> Result<usize> {
            headers
                .iter()
                .position(|h| names.contains(&h.to_lowercase().as_str()))
                .ok_or_else(|| {
                    ForecastError::DataFormat(format!("Missing column: {}", names[0]))
                })
        };

        Ok(Self {
            date: find(&["date", "timestamp", "datetime", "time"])?,
            open: find(&["open"])?,
            high: find(&["high"])?,
            low: find(&["low"])?,
            close: find(&["close"])?,
            volume: find(&["volume", "vol"])?,
        })
    }

    fn parse(&self, record: &csv::StringRecord, row: usize) -> Result<PricePoint> {
        let field = |idx: usize| -> Result<&str> {
            record.get(idx).ok_or_else(|| {
                ForecastError::DataFormat(format!("Row {} is missing column {}", row, idx))
            })
        };
        let number = |idx: usize| -> Result<f64> {
            let raw = field(idx)?;
            raw.parse::<f64>().map_err(|_| {
                ForecastError::DataFormat(format!("Row {}: '{}' is not a number", row, raw))
            })
        };

        let volume_raw = field(self.volume)?;
        let volume = match volume_raw.parse::<i64>() {
            Ok(v) => v,
            Err(_) => number(self.volume)?.round() as i64,
        };

        Ok(PricePoint {
            timestamp: parse_date(field(self.date)?, row)?,
            open: number(self.open)?,
            high: number(self.high)?,
            low: number(self.low)?,
            close: number(self.close)?,
            volume,
        })
    }
}

/// Parse `YYYY-MM-DD`, tolerating a trailing time component
fn parse_date(raw: &str, row: usize) -> Result<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ForecastError::DataFormat(format!("Row {}: bad date '{}': {}", row, raw, e)))
}
