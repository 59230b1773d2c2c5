//! Stage 4: statistics per (4-month bucket, company).

use sectorstats_core::stats::quarterly_stats;

use super::full_period::StatsReport;
use super::StageError;
use crate::charts::{bucket_scatter_name, scatter_png};
use crate::config::{StatsConfig, QUARTERLY_STATS_STEM};
use crate::export::{read_balanced_csv, stats_table, table_csv_bytes, workbook_bytes, PendingWrites};

pub fn run_quarterly(cfg: &StatsConfig) -> Result<StatsReport, StageError> {
    let ds = read_balanced_csv(&cfg.balanced_csv)?.restrict(&cfg.window)?;
    let rows = quarterly_stats(&ds);
    tracing::info!(rows = rows.len(), "quarterly statistics computed");

    let table = stats_table(&rows, true);
    let mut pending = PendingWrites::new();
    pending.add(
        cfg.tables_dir.join(format!("{QUARTERLY_STATS_STEM}.csv")),
        table_csv_bytes(&table)?,
    );
    pending.add(
        cfg.tables_dir.join(format!("{QUARTERLY_STATS_STEM}.xlsx")),
        workbook_bytes(&[("Quarterly", &table)])?,
    );
    let saved = pending.destinations();

    let mut figures = Vec::new();
    if cfg.charts.enabled {
        let dir = cfg.figures_dir.join("quarterly");
        let y_desc = format!("Close Price ({})", cfg.charts.currency);
        for (bucket, part) in ds.partition_by_bucket() {
            for (company, closes) in part.companies().iter().zip(part.columns()) {
                let path = dir.join(bucket_scatter_name(company, &bucket.label()));
                let tmp = scatter_png(
                    &path,
                    &format!("{company}: {}", bucket.pretty()),
                    &y_desc,
                    part.dates(),
                    closes,
                )?;
                pending.add_staged(tmp, path.clone());
                figures.push(path);
            }
        }
    }
    pending.commit()?;

    Ok(StatsReport {
        rows,
        saved,
        figures,
    })
}
