//! Stage 6: pivot Mean and SD by bucket, save the pivots and draw two line charts.

use std::path::PathBuf;

use sectorstats_core::pivot::PivotTable;

use super::StageError;
use crate::charts::pivot_line_png;
use crate::config::ChartConfig;
use crate::export::{
    pivot_table, read_quarterly_pivot_cells, table_csv_bytes, workbook_bytes, PendingWrites,
};

#[derive(Debug, Clone)]
pub struct ChartReport {
    pub mean: PivotTable,
    pub sd: PivotTable,
    pub saved: Vec<PathBuf>,
    pub figures: Vec<PathBuf>,
}

pub fn run_charts(cfg: &ChartConfig) -> Result<ChartReport, StageError> {
    let (mean_cells, sd_cells) = read_quarterly_pivot_cells(&cfg.quarterly_stats_csv)?;
    let mean = PivotTable::build("Mean", &mean_cells, &cfg.preferred_order);
    let sd = PivotTable::build("SD", &sd_cells, &cfg.preferred_order);
    tracing::info!(buckets = mean.buckets.len(), companies = mean.companies.len(), "pivots built");

    let mut pending = PendingWrites::new();
    for (stem, pivot) in [("mean_by_quarter_pivot", &mean), ("sd_by_quarter_pivot", &sd)] {
        let table = pivot_table(pivot);
        pending.add(cfg.tables_dir.join(format!("{stem}.csv")), table_csv_bytes(&table)?);
        pending.add(
            cfg.tables_dir.join(format!("{stem}.xlsx")),
            workbook_bytes(&[(pivot.statistic.as_str(), &table)])?,
        );
    }
    let saved = pending.destinations();

    let mut figures = Vec::new();
    if cfg.charts.enabled {
        let dir = cfg.figures_dir.join("time_series");
        let currency = &cfg.charts.currency;
        let charts = [
            (
                "avg_price_by_quarter.png",
                "Average Daily Close Price by Quarter",
                format!("Average Close Price ({currency})"),
                &mean,
            ),
            (
                "sd_by_quarter.png",
                "Standard Deviation of Daily Close Price by Quarter",
                format!("SD of Close Price ({currency})"),
                &sd,
            ),
        ];
        for (file, title, y_desc, pivot) in charts {
            // Single-row buckets leave every SD undefined.
            if !pivot.has_values() {
                tracing::warn!(statistic = %pivot.statistic, "no defined values, chart skipped");
                continue;
            }
            let path = dir.join(file);
            let tmp = pivot_line_png(&path, title, &y_desc, pivot)?;
            pending.add_staged(tmp, path.clone());
            figures.push(path);
        }
    }
    pending.commit()?;

    Ok(ChartReport {
        mean,
        sd,
        saved,
        figures,
    })
}
