//! Raw per-company price files: `Date,Close`, one row per trading day.
//!
//! Reading is lenient about the upstream layout: the date and close columns
//! are located through prioritized header lists, unparseable dates and
//! non-numeric closes are dropped, and any UTC offset on a timestamp is
//! discarded (the wall-clock date is kept, the instant is not converted).
//!
//! When no date header matches, the first column is taken as the date column
//! with a warning. yfinance's multi-row header (`Price,Close` / `Ticker,...` /
//! `Date,`) needs this; its extra header rows fail date parsing and are dropped.

use super::atomic::write_atomic;
use super::provider::DataError;
use crate::domain::{PricePoint, TickerSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Date headers, highest priority first.
pub const DATE_CANDIDATES: &[&str] = &["Date", "date", "Datetime", "datetime", "index"];

/// Close headers, highest priority first.
pub const CLOSE_CANDIDATES: &[&str] = &["Close", "close", "Adj Close", "AdjClose", "adj_close"];

/// Conventional raw file location for a company.
pub fn raw_path(raw_dir: &Path, company: &str) -> PathBuf {
    raw_dir.join(format!("{company}_raw.csv"))
}

/// Index of the first candidate (in priority order) present in `headers`.
pub fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|cand| headers.iter().position(|h| h == cand))
}

/// Parse a date or timestamp, dropping any UTC offset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local().date());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse a close price; non-numeric and non-finite values are rejected.
pub fn parse_close(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A raw file read back into a series.
#[derive(Debug, Clone)]
pub struct RawRead {
    pub series: TickerSeries,
    /// Rows discarded for an unparseable date or close.
    pub dropped_rows: usize,
}

/// Read one company's raw file.
pub fn read_raw_close(path: &Path, company: &str, symbol: &str) -> Result<RawRead, DataError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(DataError::MissingRawFile { path: display });
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::Read {
            path: display.clone(),
            reason: e.to_string(),
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DataError::Read {
            path: display.clone(),
            reason: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let close_idx = find_column(&headers, CLOSE_CANDIDATES).ok_or_else(|| DataError::MissingColumn {
        path: display.clone(),
        kind: "close",
        available: headers.clone(),
    })?;

    let date_idx = match find_column(&headers, DATE_CANDIDATES) {
        Some(idx) => idx,
        // Column 0 is only a usable date column if it is not the close column.
        None if close_idx != 0 => {
            tracing::warn!(
                path = %path.display(),
                column = %headers[0],
                "no date-like header, using the first column for dates"
            );
            0
        }
        None => {
            return Err(DataError::MissingColumn {
                path: display.clone(),
                kind: "date",
                available: headers.clone(),
            })
        }
    };

    let mut points = Vec::new();
    let mut dropped_rows = 0usize;
    for record in reader.records() {
        let Ok(record) = record else {
            dropped_rows += 1;
            continue;
        };
        let date = record.get(date_idx).and_then(parse_date);
        let close = record.get(close_idx).and_then(parse_close);
        match (date, close) {
            (Some(date), Some(close)) => points.push(PricePoint::new(date, close)),
            _ => dropped_rows += 1,
        }
    }

    if dropped_rows > 0 {
        tracing::debug!(company, dropped_rows, "dropped malformed raw rows");
    }

    let mut series = TickerSeries::new(company, symbol, points);
    series.sort();
    Ok(RawRead {
        series,
        dropped_rows,
    })
}

/// Serialize a series as `Date,Close` CSV.
pub fn raw_csv_bytes(series: &TickerSeries) -> Result<Vec<u8>, DataError> {
    let to_err = |e: csv::Error| DataError::Other(format!("csv encode: {e}"));
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Date", "Close"]).map_err(to_err)?;
    for p in &series.points {
        wtr.write_record([p.date.format("%Y-%m-%d").to_string(), p.close.to_string()])
            .map_err(to_err)?;
    }
    wtr.into_inner()
        .map_err(|e| DataError::Other(format!("csv flush: {e}")))
}

/// Write a series to `path` atomically.
pub fn write_raw_csv(path: &Path, series: &TickerSeries) -> Result<(), DataError> {
    let bytes = raw_csv_bytes(series)?;
    write_atomic(path, &bytes).map_err(|e| DataError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
