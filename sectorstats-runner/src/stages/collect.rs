//! Stage 1: download daily closes and persist one raw file per company.

use std::path::PathBuf;

use sectorstats_core::data::raw_file::raw_csv_bytes;
use sectorstats_core::data::{raw_path, DataError, DataProvider, DownloadProgress};
use sectorstats_core::domain::TickerSeries;

use super::StageError;
use crate::config::CollectConfig;
use crate::export::PendingWrites;

#[derive(Debug, Clone)]
pub struct CollectReport {
    pub provider: String,
    /// `(company, path, rows)` in roster order.
    pub files: Vec<(String, PathBuf, usize)>,
}

fn fetch_one(
    provider: &dyn DataProvider,
    cfg: &CollectConfig,
    company: &str,
    symbol: &str,
) -> Result<TickerSeries, DataError> {
    let fetched = provider.fetch_closes(symbol, cfg.window.start, cfg.window.end_exclusive())?;
    let mut points: Vec<_> = fetched.points.into_iter().filter(|p| p.is_valid()).collect();
    if points.is_empty() {
        return Err(DataError::NoData {
            company: company.to_string(),
            symbol: symbol.to_string(),
        });
    }
    points.sort_by_key(|p| p.date);
    let before = points.len();
    points.dedup_by_key(|p| p.date);
    if points.len() < before {
        tracing::debug!(company, removed = before - points.len(), "duplicate dates from provider");
    }
    Ok(TickerSeries::new(company, symbol, points))
}

/// Fetch every company, then write every raw file.
///
/// Nothing is written unless every fetch succeeds.
pub fn run_collect(
    cfg: &CollectConfig,
    provider: &dyn DataProvider,
    progress: &dyn DownloadProgress,
) -> Result<CollectReport, StageError> {
    if !provider.is_available() {
        return Err(DataError::CircuitBreakerTripped.into());
    }
    tracing::info!(provider = provider.name(), companies = cfg.companies.len(), "collect started");

    let total = cfg.companies.len();
    let mut series = Vec::with_capacity(total);
    for (i, company) in cfg.companies.iter().enumerate() {
        progress.on_start(&company.symbol, i, total);
        let result = fetch_one(provider, cfg, &company.name, &company.symbol);
        progress.on_complete(
            &company.symbol,
            i,
            total,
            &result.as_ref().map(|s| s.len()).map_err(clone_error),
        );
        match result {
            Ok(s) => series.push(s),
            Err(e) => {
                progress.on_batch_complete(i, 1, total);
                return Err(e.into());
            }
        }
    }
    progress.on_batch_complete(total, 0, total);

    let mut pending = PendingWrites::new();
    let mut files = Vec::with_capacity(total);
    for s in &series {
        let path = raw_path(&cfg.raw_dir, &s.company);
        pending.add(path.clone(), raw_csv_bytes(s)?);
        files.push((s.company.clone(), path, s.len()));
    }
    pending.commit()?;
    tracing::info!(raw_dir = %cfg.raw_dir.display(), "collect finished");

    Ok(CollectReport {
        provider: provider.name().to_string(),
        files,
    })
}

/// `DataError` is not `Clone`; progress reporting only needs its message.
fn clone_error(e: &DataError) -> DataError {
    match e {
        DataError::NoData { company, symbol } => DataError::NoData {
            company: company.clone(),
            symbol: symbol.clone(),
        },
        other => DataError::Other(other.to_string()),
    }
}
