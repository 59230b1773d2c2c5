//! Stage 2: align the raw files into a balanced dataset and check for splits.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use sectorstats_core::data::{balance_series, raw_path, read_raw_close, splits_in_window, DataProvider};
use sectorstats_core::domain::{BalancedDataset, SplitEvent};

use super::StageError;
use crate::config::{BalanceConfig, SPLIT_REPORT};
use crate::export::{
    balanced_parquet_bytes, balanced_table, manifest_bytes, splits_table, table_csv_bytes,
    workbook_bytes, DatasetManifest, PendingWrites,
};

/// Rows shown at each end of the preview.
const PREVIEW_ROWS: usize = 3;

/// What the balance stage did, printable as the balancing summary.
#[derive(Debug, Clone)]
pub struct BalanceReport {
    pub companies: Vec<String>,
    pub rows_in_window: usize,
    pub balanced_rows: usize,
    pub dropped_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub splits: Vec<SplitEvent>,
    pub saved: Vec<PathBuf>,
    pub head: Vec<(NaiveDate, Vec<f64>)>,
    pub tail: Vec<(NaiveDate, Vec<f64>)>,
}

fn preview(ds: &BalancedDataset, rows: impl Iterator<Item = usize>) -> Vec<(NaiveDate, Vec<f64>)> {
    rows.filter_map(|i| ds.row(i)).collect()
}

fn write_preview(
    f: &mut fmt::Formatter<'_>,
    companies: &[String],
    rows: &[(NaiveDate, Vec<f64>)],
) -> fmt::Result {
    write!(f, "{:<12}", "Date")?;
    for c in companies {
        write!(f, "{c:>12}")?;
    }
    writeln!(f)?;
    for (date, values) in rows {
        write!(f, "{:<12}", date.format("%Y-%m-%d").to_string())?;
        for v in values {
            write!(f, "{v:>12.2}")?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== BALANCING SUMMARY ===")?;
        writeln!(f, "Raw rows (within window):     {}", self.rows_in_window)?;
        writeln!(f, "Balanced rows (common dates): {}", self.balanced_rows)?;
        writeln!(f, "Dropped rows:                 {}", self.dropped_rows)?;
        writeln!(
            f,
            "Final date range:             {} to {}",
            self.first_date, self.last_date
        )?;

        writeln!(f, "\n=== STOCK SPLIT CHECK (within window) ===")?;
        if self.splits.is_empty() {
            writeln!(f, "No split events found within the study window for these tickers.")?;
        } else {
            writeln!(f, "WARNING: Split events found within window:")?;
            for s in &self.splits {
                writeln!(f, "  {} ({}) on {}: ratio {}", s.company, s.symbol, s.date, s.ratio)?;
            }
        }

        writeln!(f, "\nSaved:")?;
        for p in &self.saved {
            writeln!(f, "- {}", p.display())?;
        }

        writeln!(f, "\nHead:")?;
        write_preview(f, &self.companies, &self.head)?;
        writeln!(f, "\nTail:")?;
        write_preview(f, &self.companies, &self.tail)
    }
}

/// Read raw files, balance, check splits, then write the processed artifacts.
pub fn run_balance(
    cfg: &BalanceConfig,
    provider: &dyn DataProvider,
) -> Result<BalanceReport, StageError> {
    tracing::info!(companies = cfg.companies.len(), "balance started");

    let mut series = Vec::with_capacity(cfg.companies.len());
    for company in &cfg.companies {
        let read = read_raw_close(
            &raw_path(&cfg.raw_dir, &company.name),
            &company.name,
            &company.symbol,
        )?;
        series.push(read.series);
    }

    let outcome = balance_series(&series, &cfg.window)?;
    let ds = &outcome.dataset;

    let mut splits = Vec::new();
    for company in &cfg.companies {
        let records = provider.fetch_splits(&company.symbol)?;
        splits.extend(splits_in_window(&company.name, &company.symbol, &records, &cfg.window));
    }
    if !splits.is_empty() {
        tracing::warn!(count = splits.len(), "split events inside the study window");
    }

    // Render every artifact before touching the filesystem.
    let table = balanced_table(ds);
    let csv_bytes = table_csv_bytes(&table)?;
    let manifest = DatasetManifest {
        dataset_name: cfg.dataset_name.clone(),
        companies: ds.companies().to_vec(),
        window_start: cfg.window.start,
        window_end: cfg.window.end,
        first_date: ds.first_date(),
        last_date: ds.last_date(),
        rows_in_window: outcome.rows_in_window,
        balanced_rows: ds.len(),
        dropped_rows: outcome.dropped_rows(),
        csv_blake3: blake3::hash(&csv_bytes).to_hex().to_string(),
    };

    let dir = &cfg.processed_dir;
    let csv_path = dir.join(format!("{}.csv", cfg.dataset_name));
    let xlsx_path = dir.join(format!("{}.xlsx", cfg.dataset_name));
    let parquet_path = dir.join(format!("{}.parquet", cfg.dataset_name));
    let manifest_path = dir.join(format!("{}.manifest.json", cfg.dataset_name));

    let mut pending = PendingWrites::new();
    pending.add(csv_path, csv_bytes);
    pending.add(xlsx_path, workbook_bytes(&[("Balanced", &table)])?);
    pending.add(parquet_path, balanced_parquet_bytes(ds)?);
    pending.add(manifest_path, manifest_bytes(&manifest)?);

    let split_path = dir.join(SPLIT_REPORT);
    if splits.is_empty() {
        // No splits this run: drop any report left by an earlier one.
        pending.remove(split_path);
    } else {
        pending.add(split_path, table_csv_bytes(&splits_table(&splits))?);
    }
    let saved = pending.commit()?;
    tracing::info!(rows = ds.len(), "balance finished");

    let n = ds.len();
    Ok(BalanceReport {
        companies: ds.companies().to_vec(),
        rows_in_window: outcome.rows_in_window,
        balanced_rows: n,
        dropped_rows: outcome.dropped_rows(),
        first_date: ds.first_date(),
        last_date: ds.last_date(),
        splits,
        saved,
        head: preview(ds, 0..PREVIEW_ROWS.min(n)),
        tail: preview(ds, n.saturating_sub(PREVIEW_ROWS)..n),
    })
}
