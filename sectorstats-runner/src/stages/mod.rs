//! Pipeline stages.
//!
//! Each stage reads its inputs in full, computes, and only then writes. Stages
//! share nothing in memory; a stage's inputs are the files an earlier stage
//! wrote.

pub mod balance;
pub mod chart;
pub mod collect;
pub mod correlations;
pub mod full_period;
pub mod quarterly;

pub use balance::{run_balance, BalanceReport};
pub use chart::{run_charts, ChartReport};
pub use collect::{run_collect, CollectReport};
pub use correlations::{run_correlations, CorrelationReport};
pub use full_period::{run_full_period, StatsReport};
pub use quarterly::run_quarterly;

use sectorstats_core::data::DataError;
use sectorstats_core::domain::DatasetError;
use thiserror::Error;

use crate::charts::ChartError;
use crate::config::ConfigError;
use crate::export::ExportError;

/// Errors from any stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("chart error: {0}")]
    Chart(#[from] ChartError),
}

