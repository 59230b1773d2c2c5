//! Descriptive statistics: pure functions over a slice of closes.
//!
//! Undefined results are `None`, never `NaN`; the exporters turn `None` into
//! an empty cell.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every statistic reported for one series of closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub sd: Option<f64>,
    pub median: f64,
    pub mode: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub iqr: f64,
    pub cv: Option<f64>,
    /// Currency units per elapsed calendar day.
    pub slope: Option<f64>,
}

impl Summary {
    /// Compute the full summary. `None` for an empty series.
    ///
    /// `dates` and `values` are parallel; the slope uses whole days elapsed
    /// since `dates[0]`.
    pub fn compute(dates: &[NaiveDate], values: &[f64]) -> Option<Self> {
        if values.is_empty() || dates.len() != values.len() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = mean(values)?;
        let sd = sample_sd(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q2 = quantile_sorted(&sorted, 0.50)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        Some(Self {
            count: values.len(),
            mean,
            sd,
            median: q2,
            mode: mode_min(values),
            min,
            max,
            range: max - min,
            q1,
            q2,
            q3,
            iqr: q3 - q1,
            cv: coefficient_of_variation(mean, sd),
            slope: ols_slope_per_day(dates, values),
        })
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N − 1 denominator). Undefined below two values.
pub fn sample_sd(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, 0.5)
}

/// Linear-interpolation quantile of an ascending slice, `h = (n − 1)p`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Smallest of the most frequent values. `None` when no value repeats.
pub fn mode_min(values: &[f64]) -> Option<f64> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for &v in values {
        // -0.0 and 0.0 are the same price
        let key = if v == 0.0 { 0.0f64 } else { v }.to_bits();
        *counts.entry(key).or_default() += 1;
    }
    let top = counts.values().copied().max()?;
    if top < 2 {
        return None;
    }
    counts
        .into_iter()
        .filter(|&(_, n)| n == top)
        .map(|(bits, _)| f64::from_bits(bits))
        .min_by(f64::total_cmp)
}

/// SD / mean. Undefined when the mean is zero or the SD is undefined.
pub fn coefficient_of_variation(mean: f64, sd: Option<f64>) -> Option<f64> {
    let sd = sd?;
    if mean == 0.0 {
        return None;
    }
    Some(sd / mean)
}

/// Ordinary least-squares slope of `values` on whole days since `dates[0]`.
///
/// Undefined when fewer than two distinct days are present.
pub fn ols_slope_per_day(dates: &[NaiveDate], values: &[f64]) -> Option<f64> {
    if dates.len() != values.len() || dates.len() < 2 {
        return None;
    }
    let origin = dates[0];
    let xs: Vec<f64> = dates
        .iter()
        .map(|d| (*d - origin).num_days() as f64)
        .collect();
    let x_mean = mean(&xs)?;
    let y_mean = mean(values)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs.iter().zip(values) {
        sxy += (x - x_mean) * (y - y_mean);
        sxx += (x - x_mean).powi(2);
    }
    if sxx == 0.0 {
        return None;
    }
    Some(sxy / sxx)
}
