//! Stage 3: statistics over the whole balanced window, plus one scatter per company.

use std::path::PathBuf;

use sectorstats_core::stats::{full_period_stats, StatRow};

use super::StageError;
use crate::charts::scatter_png;
use crate::config::{StatsConfig, FULL_PERIOD_STATS_STEM};
use crate::export::{read_balanced_csv, stats_table, table_csv_bytes, workbook_bytes, PendingWrites};

/// Rows computed by a statistics stage and the files it wrote.
#[derive(Debug, Clone)]
pub struct StatsReport {
    pub rows: Vec<StatRow>,
    pub saved: Vec<PathBuf>,
    pub figures: Vec<PathBuf>,
}

pub fn run_full_period(cfg: &StatsConfig) -> Result<StatsReport, StageError> {
    let ds = read_balanced_csv(&cfg.balanced_csv)?;
    let rows = full_period_stats(&ds);
    tracing::info!(companies = rows.len(), rows = ds.len(), "full-period statistics computed");

    let table = stats_table(&rows, false);
    let mut pending = PendingWrites::new();
    pending.add(
        cfg.tables_dir.join(format!("{FULL_PERIOD_STATS_STEM}.csv")),
        table_csv_bytes(&table)?,
    );
    pending.add(
        cfg.tables_dir.join(format!("{FULL_PERIOD_STATS_STEM}.xlsx")),
        workbook_bytes(&[("Full Period", &table)])?,
    );
    let saved = pending.destinations();

    let mut figures = Vec::new();
    if cfg.charts.enabled {
        let dir = cfg.figures_dir.join("full_period");
        for (company, closes) in ds.companies().iter().zip(ds.columns()) {
            let path = dir.join(format!("{company}_scatter_full_period.png"));
            let tmp = scatter_png(
                &path,
                &format!("{company}: Daily Close Price (Full Period)"),
                &format!("Close Price ({})", cfg.charts.currency),
                ds.dates(),
                closes,
            )?;
            pending.add_staged(tmp, path.clone());
            figures.push(path);
        }
    }
    pending.commit()?;

    Ok(StatsReport {
        rows,
        saved,
        figures,
    })
}
