//! Stage 5: pooled and per-bucket Pearson matrices in one workbook.

use std::path::PathBuf;

use sectorstats_core::correlation::{pooled_and_per_bucket, CorrelationMatrix};

use super::StageError;
use crate::config::{CorrelationConfig, CORRELATION_WORKBOOK};
use crate::export::{correlation_table, read_balanced_csv, workbook_bytes, PendingWrites, Table};

#[derive(Debug, Clone)]
pub struct CorrelationReport {
    pub matrices: Vec<CorrelationMatrix>,
    pub workbook: PathBuf,
}

pub fn run_correlations(cfg: &CorrelationConfig) -> Result<CorrelationReport, StageError> {
    let ds = read_balanced_csv(&cfg.balanced_csv)?.restrict(&cfg.window)?;
    let matrices = pooled_and_per_bucket(&ds);
    tracing::info!(sheets = matrices.len(), "correlation matrices computed");

    let tables: Vec<(String, Table)> = matrices
        .iter()
        .map(|m| (m.label.clone(), correlation_table(m)))
        .collect();
    let sheets: Vec<(&str, &Table)> = tables.iter().map(|(n, t)| (n.as_str(), t)).collect();

    let workbook = cfg.tables_dir.join(CORRELATION_WORKBOOK);
    let mut pending = PendingWrites::new();
    pending.add(workbook.clone(), workbook_bytes(&sheets)?);
    pending.commit()?;

    Ok(CorrelationReport { matrices, workbook })
}
