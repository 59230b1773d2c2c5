//! Pearson correlation matrices, pooled and per bucket.

use crate::domain::BalancedDataset;
use crate::stats::mean;
use serde::{Deserialize, Serialize};

/// Label of the matrix computed over the whole balanced window.
pub const POOLED_LABEL: &str = "Pooled";

/// Square company × company table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub label: String,
    pub companies: Vec<String>,
    /// `values[i][j]`; `None` where a column has no variance.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn of(label: impl Into<String>, dataset: &BalancedDataset) -> Self {
        let cols = dataset.columns();
        let n = cols.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = if i == j {
                    // A column correlates perfectly with itself only if it varies.
                    pearson(&cols[i], &cols[j]).map(|_| 1.0)
                } else {
                    pearson(&cols[i], &cols[j])
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        Self {
            label: label.into(),
            companies: dataset.companies().to_vec(),
            values,
        }
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.companies.iter().position(|c| c == a)?;
        let j = self.companies.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Pearson's r, clamped to `[-1, 1]`.
///
/// `None` for fewer than two pairs or when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// The pooled matrix followed by one matrix per bucket, chronologically.
pub fn pooled_and_per_bucket(dataset: &BalancedDataset) -> Vec<CorrelationMatrix> {
    let mut out = vec![CorrelationMatrix::of(POOLED_LABEL, dataset)];
    out.extend(
        dataset
            .partition_by_bucket()
            .iter()
            .map(|(bucket, part)| CorrelationMatrix::of(bucket.label(), part)),
    );
    out
}
