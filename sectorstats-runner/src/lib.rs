//! sectorstats runner: pipeline configuration, stages and artifact export.
//!
//! This crate builds on `sectorstats-core` to provide:
//! - TOML configuration with per-stage views
//! - The six pipeline stages (collect, balance, full-period and quarterly
//!   statistics, correlations, charts)
//! - CSV, XLSX and Parquet export plus read-back of the canonical CSVs
//! - PNG charts

pub mod charts;
pub mod config;
pub mod export;
pub mod stages;

pub use charts::ChartError;
pub use config::{
    BalanceConfig, ChartConfig, CollectConfig, ConfigError, CorrelationConfig, PipelineConfig,
    StatsConfig,
};
pub use export::{DatasetManifest, ExportError, Table};
pub use stages::{
    run_balance, run_charts, run_collect, run_correlations, run_full_period, run_quarterly,
    BalanceReport, ChartReport, CollectReport, CorrelationReport, StageError, StatsReport,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
        assert_send::<StatsConfig>();
        assert_sync::<StatsConfig>();
        assert_send::<ChartConfig>();
        assert_sync::<ChartConfig>();
    }

    #[test]
    fn reports_are_send_sync() {
        assert_send::<BalanceReport>();
        assert_sync::<BalanceReport>();
        assert_send::<StatsReport>();
        assert_sync::<StatsReport>();
        assert_send::<CorrelationReport>();
        assert_sync::<CorrelationReport>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<StageError>();
        assert_sync::<StageError>();
    }
}
