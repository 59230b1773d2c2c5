//! Pipeline configuration.
//!
//! One TOML file describes the whole study. Every section is optional and the
//! defaults reproduce the built-in four-company study. Each stage receives a
//! narrow view built by [`PipelineConfig`], never the whole file.

use chrono::NaiveDate;
use sectorstats_core::data::YahooSettings;
use sectorstats_core::domain::{
    default_roster, validate_roster, Company, RosterError, StudyWindow, WindowError,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid roster: {0}")]
    Roster(#[from] RosterError),

    #[error("invalid window: {0}")]
    Window(#[from] WindowError),
}

/// Whole-pipeline configuration as read from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub window: WindowSection,
    pub companies: Vec<Company>,
    pub paths: PathsConfig,
    pub provider: ProviderConfig,
    pub charts: ChartsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap_or_default(),
        }
    }
}

/// Output locations, relative to `root` unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub root: PathBuf,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub tables_dir: PathBuf,
    pub figures_dir: PathBuf,
    /// File stem of the balanced dataset artifacts.
    pub dataset_name: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            tables_dir: PathBuf::from("outputs/tables"),
            figures_dir: PathBuf::from("outputs/figures"),
            dataset_name: "it_sector_balanced_close_2023_2024".into(),
        }
    }
}

impl PathsConfig {
    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.resolve(&self.raw_dir)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.resolve(&self.processed_dir)
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.resolve(&self.tables_dir)
    }

    pub fn figures_dir(&self) -> PathBuf {
        self.resolve(&self.figures_dir)
    }

    /// Canonical balanced CSV read by every downstream stage.
    pub fn balanced_csv(&self) -> PathBuf {
        self.processed_dir()
            .join(format!("{}.csv", self.dataset_name))
    }

    pub fn quarterly_stats_csv(&self) -> PathBuf {
        self.tables_dir().join(QUARTERLY_STATS_STEM).with_extension("csv")
    }
}

pub const FULL_PERIOD_STATS_STEM: &str = "full_period_statistics";
pub const QUARTERLY_STATS_STEM: &str = "quarterly_statistics_4month";
pub const CORRELATION_WORKBOOK: &str = "correlation_matrices.xlsx";
pub const SPLIT_REPORT: &str = "stock_split_events_in_window.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Extra attempts after a transient failure.
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub synthetic_seed: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            timeout_secs: 30,
            synthetic_seed: 42,
        }
    }
}

impl ProviderConfig {
    pub fn yahoo_settings(&self) -> YahooSettings {
        YahooSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            ..YahooSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub enabled: bool,
    /// Currency symbol used in axis labels.
    pub currency: String,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            currency: "₹".into(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: WindowSection::default(),
            companies: default_roster(),
            paths: PathsConfig::default(),
            provider: ProviderConfig::default(),
            charts: ChartsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_roster(&self.companies)?;
        self.study_window()?;
        Ok(())
    }

    pub fn study_window(&self) -> Result<StudyWindow, WindowError> {
        StudyWindow::new(self.window.start, self.window.end)
    }

    pub fn company_names(&self) -> Vec<String> {
        self.companies.iter().map(|c| c.name.clone()).collect()
    }

    pub fn collect(&self) -> Result<CollectConfig, ConfigError> {
        Ok(CollectConfig {
            companies: self.companies.clone(),
            window: self.study_window()?,
            raw_dir: self.paths.raw_dir(),
        })
    }

    pub fn balance(&self) -> Result<BalanceConfig, ConfigError> {
        Ok(BalanceConfig {
            companies: self.companies.clone(),
            window: self.study_window()?,
            raw_dir: self.paths.raw_dir(),
            processed_dir: self.paths.processed_dir(),
            dataset_name: self.paths.dataset_name.clone(),
        })
    }

    pub fn stats(&self) -> Result<StatsConfig, ConfigError> {
        Ok(StatsConfig {
            balanced_csv: self.paths.balanced_csv(),
            window: self.study_window()?,
            tables_dir: self.paths.tables_dir(),
            figures_dir: self.paths.figures_dir(),
            charts: self.charts.clone(),
        })
    }

    pub fn correlation(&self) -> Result<CorrelationConfig, ConfigError> {
        Ok(CorrelationConfig {
            balanced_csv: self.paths.balanced_csv(),
            window: self.study_window()?,
            tables_dir: self.paths.tables_dir(),
        })
    }

    pub fn chart(&self) -> ChartConfig {
        ChartConfig {
            quarterly_stats_csv: self.paths.quarterly_stats_csv(),
            preferred_order: self.company_names(),
            tables_dir: self.paths.tables_dir(),
            figures_dir: self.paths.figures_dir(),
            charts: self.charts.clone(),
        }
    }
}

/// Inputs of the collect stage.
#[derive(Debug, Clone)]
pub struct CollectConfig {
    pub companies: Vec<Company>,
    pub window: StudyWindow,
    pub raw_dir: PathBuf,
}

/// Inputs of the balance stage.
#[derive(Debug, Clone)]
pub struct BalanceConfig {
    pub companies: Vec<Company>,
    pub window: StudyWindow,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub dataset_name: String,
}

/// Inputs shared by the full-period and quarterly statistics stages.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    pub balanced_csv: PathBuf,
    pub window: StudyWindow,
    pub tables_dir: PathBuf,
    pub figures_dir: PathBuf,
    pub charts: ChartsConfig,
}

#[derive(Debug, Clone)]
pub struct CorrelationConfig {
    pub balanced_csv: PathBuf,
    pub window: StudyWindow,
    pub tables_dir: PathBuf,
}

/// Inputs of the chart stage.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub quarterly_stats_csv: PathBuf,
    /// Company order for pivot columns and chart series.
    pub preferred_order: Vec<String>,
    pub tables_dir: PathBuf,
    pub figures_dir: PathBuf,
    pub charts: ChartsConfig,
}
