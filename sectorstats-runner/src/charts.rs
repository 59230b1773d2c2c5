//! PNG charts drawn with plotters.
//!
//! Scatter plots put elapsed days on the x axis and label ticks with the
//! calendar date. Line charts put bucket indices on the x axis and label
//! ticks `YYYY Qn`. Drawing goes to a temporary sibling file that the calling
//! stage renames into place with the rest of its outputs; a failed draw
//! removes its temporary file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use plotters::prelude::*;
use thiserror::Error;

use sectorstats_core::pivot::PivotTable;

const SCATTER_SIZE: (u32, u32) = (1000, 600);
const LINE_SIZE: (u32, u32) = (1400, 760);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot for {0}")]
    Empty(String),

    #[error("failed to draw {path}: {reason}")]
    Draw { path: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Padded `(low, high)` over the finite values; `None` when there are none.
///
/// A flat series gets a band of ±1 so the axis is never degenerate.
pub fn value_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    if lo == hi {
        return Some((lo - 1.0, hi + 1.0));
    }
    let pad = (hi - lo) * 0.05;
    Some((lo - pad, hi + pad))
}

/// Runs of consecutive defined values as `(index, value)` points.
///
/// A missing value breaks the line instead of being bridged.
pub fn defined_segments(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => current.push((i as f64, *v)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Tick label for a bucket-index axis position; empty between buckets.
pub fn bucket_tick(x: f64, labels: &[String]) -> String {
    if (x - x.round()).abs() > 1e-6 || x < 0.0 {
        return String::new();
    }
    labels.get(x.round() as usize).cloned().unwrap_or_default()
}

/// Tick label for an elapsed-days axis position.
pub fn day_tick(x: f64, origin: NaiveDate) -> String {
    (origin + chrono::Duration::days(x.round() as i64))
        .format("%Y-%m-%d")
        .to_string()
}

/// File name used for a company's bucket scatter plot.
pub fn bucket_scatter_name(company: &str, label: &str) -> String {
    format!("{company}_{label}_scatter.png")
}

fn tmp_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}.tmp.png"))
}

fn draw_err(path: &Path) -> impl Fn(String) -> ChartError + '_ {
    move |reason| ChartError::Draw {
        path: path.display().to_string(),
        reason,
    }
}

/// Keep `tmp` on success, delete it on failure.
fn finish(tmp: PathBuf, drawn: Result<(), ChartError>) -> Result<PathBuf, ChartError> {
    match drawn {
        Ok(()) => Ok(tmp),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn prepare(path: &Path) -> Result<PathBuf, ChartError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ChartError::Io {
            path: parent.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(tmp_path(path))
}

/// Date × close scatter plot destined for `path`; returns the temporary file drawn.
pub fn scatter_png(
    path: &Path,
    title: &str,
    y_desc: &str,
    dates: &[NaiveDate],
    closes: &[f64],
) -> Result<PathBuf, ChartError> {
    let origin = *dates.first().ok_or_else(|| ChartError::Empty(title.to_string()))?;
    let (y_lo, y_hi) = value_range(closes).ok_or_else(|| ChartError::Empty(title.to_string()))?;
    let span = dates
        .last()
        .map(|d| (*d - origin).num_days() as f64)
        .unwrap_or(0.0)
        .max(1.0);

    let tmp = prepare(path)?;
    let err = draw_err(path);
    let drawn = (|| -> Result<(), ChartError> {
        let root = BitMapBackend::new(&tmp, SCATTER_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(|e| err(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(-0.5..span + 0.5, y_lo..y_hi)
            .map_err(|e| err(e.to_string()))?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(y_desc)
            .x_labels(8)
            .x_label_formatter(&|x| day_tick(*x, origin))
            .draw()
            .map_err(|e| err(e.to_string()))?;

        chart
            .draw_series(dates.iter().zip(closes).map(|(d, c)| {
                Circle::new(((*d - origin).num_days() as f64, *c), 2, BLUE.filled())
            }))
            .map_err(|e| err(e.to_string()))?;

        root.present().map_err(|e| err(e.to_string()))
    })();
    finish(tmp, drawn)
}

/// One line per company across the pivot's buckets; returns the temporary file drawn.
///
/// A pivot with no defined value is [`ChartError::Empty`].
pub fn pivot_line_png(
    path: &Path,
    title: &str,
    y_desc: &str,
    pivot: &PivotTable,
) -> Result<PathBuf, ChartError> {
    if pivot.buckets.is_empty() || pivot.companies.is_empty() {
        return Err(ChartError::Empty(title.to_string()));
    }
    let (y_lo, y_hi) = value_range(pivot.values.iter().flatten().flatten())
        .ok_or_else(|| ChartError::Empty(title.to_string()))?;
    let labels: Vec<String> = pivot.buckets.iter().map(|b| b.pretty()).collect();
    let n = labels.len() as f64;

    let tmp = prepare(path)?;
    let err = draw_err(path);
    let drawn = (|| -> Result<(), ChartError> {
        let root = BitMapBackend::new(&tmp, LINE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(|e| err(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(24)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5..n - 0.5, y_lo..y_hi)
            .map_err(|e| err(e.to_string()))?;

        chart
            .configure_mesh()
            .x_desc("Quarter (4-month)")
            .y_desc(y_desc)
            .x_labels(labels.len() * 2 + 1)
            .x_label_formatter(&|x| bucket_tick(*x, &labels))
            .draw()
            .map_err(|e| err(e.to_string()))?;

        for (c, company) in pivot.companies.iter().enumerate() {
            let color = Palette99::pick(c).to_rgba();
            let values: Vec<Option<f64>> = pivot.values.iter().map(|row| row[c]).collect();
            let mut first = true;
            for segment in defined_segments(&values) {
                let line = chart
                    .draw_series(LineSeries::new(segment.clone(), color.stroke_width(3)))
                    .map_err(|e| err(e.to_string()))?;
                if first {
                    line.label(company.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
                    });
                    first = false;
                }
                chart
                    .draw_series(
                        segment
                            .into_iter()
                            .map(|p| Circle::new(p, 4, color.filled())),
                    )
                    .map_err(|e| err(e.to_string()))?;
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()
            .map_err(|e| err(e.to_string()))?;

        root.present().map_err(|e| err(e.to_string()))
    })();
    finish(tmp, drawn)
}
