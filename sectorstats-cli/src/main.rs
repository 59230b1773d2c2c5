//! sectorstats CLI: one subcommand per pipeline stage.
//!
//! Commands:
//! - `collect`: download daily closes and write one raw CSV per company
//! - `balance`: align raw files into the balanced dataset, check splits
//! - `full-stats`: descriptive statistics over the whole window
//! - `quarterly-stats`: the same statistics per 4-month bucket
//! - `correlations`: pooled and per-bucket Pearson matrices
//! - `charts`: Mean/SD pivots and their line charts
//! - `all`: every stage in order, stopping at the first failure

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sectorstats_core::data::{DataProvider, StdoutProgress, SyntheticProvider, YahooProvider};
use sectorstats_runner::{
    run_balance, run_charts, run_collect, run_correlations, run_full_period, run_quarterly,
    PipelineConfig, StatsReport,
};

#[derive(Parser)]
#[command(
    name = "sectorstats",
    about = "sectorstats: balanced close prices, descriptive statistics and correlations"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to the built-in study.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily closes and write one raw CSV per company.
    Collect {
        /// Use the seeded synthetic random walk instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Build the balanced dataset from the raw files and check for splits.
    Balance {
        /// Use the synthetic provider for the split check.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Full-period statistics and scatter plots.
    FullStats,
    /// Per-bucket statistics and scatter plots.
    QuarterlyStats,
    /// Pooled and per-bucket correlation workbook.
    Correlations,
    /// Mean/SD pivots and line charts.
    Charts,
    /// Run every stage in order.
    All {
        /// Use the synthetic provider throughout.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let cfg = match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    tracing::debug!(
        source = %path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        companies = cfg.companies.len(),
        start = %cfg.window.start,
        end = %cfg.window.end,
        "configuration loaded"
    );
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Collect { synthetic } => cmd_collect(&cfg, synthetic),
        Commands::Balance { synthetic } => cmd_balance(&cfg, synthetic),
        Commands::FullStats => cmd_full_stats(&cfg),
        Commands::QuarterlyStats => cmd_quarterly_stats(&cfg),
        Commands::Correlations => cmd_correlations(&cfg),
        Commands::Charts => cmd_charts(&cfg),
        Commands::All { synthetic } => {
            tracing::info!(synthetic, "running every stage");
            cmd_collect(&cfg, synthetic)?;
            cmd_balance(&cfg, synthetic)?;
            cmd_full_stats(&cfg)?;
            cmd_quarterly_stats(&cfg)?;
            cmd_correlations(&cfg)?;
            cmd_charts(&cfg)
        }
    }
}

fn provider(cfg: &PipelineConfig, synthetic: bool) -> Result<Box<dyn DataProvider>> {
    if synthetic {
        Ok(Box::new(SyntheticProvider::new(cfg.provider.synthetic_seed)))
    } else {
        Ok(Box::new(YahooProvider::new(cfg.provider.yahoo_settings())?))
    }
}

fn cmd_collect(cfg: &PipelineConfig, synthetic: bool) -> Result<()> {
    let provider = provider(cfg, synthetic)?;
    let report = run_collect(&cfg.collect()?, provider.as_ref(), &StdoutProgress)?;
    println!("Saved raw CSVs ({}):", report.provider);
    for (company, path, rows) in &report.files {
        println!("- {company}: {} ({rows} rows)", path.display());
    }
    Ok(())
}

fn cmd_balance(cfg: &PipelineConfig, synthetic: bool) -> Result<()> {
    let provider = provider(cfg, synthetic)?;
    let report = run_balance(&cfg.balance()?, provider.as_ref())?;
    print!("{report}");
    Ok(())
}

fn print_stats(title: &str, report: &StatsReport) {
    println!("=== {title} ===");
    println!(
        "{:<10} {:>8} {:>12} {:>10} {:>12} {:>12}",
        "Bucket", "Company", "Mean", "SD", "Median", "Slope/day"
    );
    for r in &report.rows {
        let s = &r.summary;
        let fmt_opt = |v: Option<f64>| v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "-".into());
        println!(
            "{:<10} {:>8} {:>12.2} {:>10} {:>12.2} {:>12}",
            r.bucket.map(|b| b.label()).unwrap_or_else(|| "all".into()),
            r.company,
            s.mean,
            fmt_opt(s.sd),
            s.median,
            fmt_opt(s.slope),
        );
    }
    println!("\nSaved:");
    for p in report.saved.iter().chain(&report.figures) {
        println!("- {}", p.display());
    }
}

fn cmd_full_stats(cfg: &PipelineConfig) -> Result<()> {
    let report = run_full_period(&cfg.stats()?)?;
    print_stats("FULL-PERIOD STATISTICS", &report);
    Ok(())
}

fn cmd_quarterly_stats(cfg: &PipelineConfig) -> Result<()> {
    let report = run_quarterly(&cfg.stats()?)?;
    print_stats("QUARTERLY (4-MONTH) STATISTICS", &report);
    Ok(())
}

fn cmd_correlations(cfg: &PipelineConfig) -> Result<()> {
    let report = run_correlations(&cfg.correlation()?)?;
    for m in &report.matrices {
        println!("\n=== Correlation: {} ===", m.label);
        print!("{:<10}", "");
        for c in &m.companies {
            print!("{c:>10}");
        }
        println!();
        for (name, row) in m.companies.iter().zip(&m.values) {
            print!("{name:<10}");
            for v in row {
                match v {
                    Some(r) => print!("{r:>10.3}"),
                    None => print!("{:>10}", "-"),
                }
            }
            println!();
        }
    }
    println!("\nSaved: {}", report.workbook.display());
    Ok(())
}

fn cmd_charts(cfg: &PipelineConfig) -> Result<()> {
    let report = run_charts(&cfg.chart())?;
    println!(
        "Pivoted {} buckets x {} companies",
        report.mean.buckets.len(),
        report.mean.companies.len()
    );
    println!("Saved:");
    for p in report.saved.iter().chain(&report.figures) {
        println!("- {}", p.display());
    }
    Ok(())
}
