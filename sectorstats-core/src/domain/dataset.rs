//! Balanced dataset: dates shared by every company, no gaps.
//!
//! Construction validates the post-conditions the rest of the pipeline relies
//! on, so a `BalancedDataset` value is always non-empty, gap-free and strictly
//! date-ascending.

use super::bucket::QuarterBucket;
use super::window::StudyWindow;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("balanced dataset is empty: raw files may not overlap in dates")]
    Empty,

    #[error("balanced dataset still has missing values ({company} on {date})")]
    MissingValues { company: String, date: NaiveDate },

    #[error("duplicate dates found in balanced dataset ({date})")]
    DuplicateDates { date: NaiveDate },

    #[error("dates are not ascending ({earlier} appears after {later})")]
    Unordered { earlier: NaiveDate, later: NaiveDate },

    #[error("column '{company}' has {actual} values, expected {expected}")]
    ShapeMismatch {
        company: String,
        expected: usize,
        actual: usize,
    },

    #[error("company '{0}' appears more than once")]
    DuplicateCompany(String),

    #[error("dataset has no company columns")]
    NoCompanies,
}

/// Date-indexed table with one column per company.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancedDataset {
    dates: Vec<NaiveDate>,
    companies: Vec<String>,
    /// Column-major: `columns[c][row]`.
    columns: Vec<Vec<f64>>,
}

impl BalancedDataset {
    /// Build and validate a dataset.
    pub fn new(
        dates: Vec<NaiveDate>,
        companies: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, DatasetError> {
        let ds = Self {
            dates,
            companies,
            columns,
        };
        ds.validate()?;
        Ok(ds)
    }

    /// Check every invariant. Called by the constructor.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.companies.is_empty() {
            return Err(DatasetError::NoCompanies);
        }
        if self.dates.is_empty() {
            return Err(DatasetError::Empty);
        }
        for (i, name) in self.companies.iter().enumerate() {
            if self.companies[..i].contains(name) {
                return Err(DatasetError::DuplicateCompany(name.clone()));
            }
        }
        if self.columns.len() != self.companies.len() {
            return Err(DatasetError::ShapeMismatch {
                company: "<columns>".into(),
                expected: self.companies.len(),
                actual: self.columns.len(),
            });
        }
        for (name, col) in self.companies.iter().zip(&self.columns) {
            if col.len() != self.dates.len() {
                return Err(DatasetError::ShapeMismatch {
                    company: name.clone(),
                    expected: self.dates.len(),
                    actual: col.len(),
                });
            }
            if let Some(row) = col.iter().position(|v| !v.is_finite()) {
                return Err(DatasetError::MissingValues {
                    company: name.clone(),
                    date: self.dates[row],
                });
            }
        }
        for w in self.dates.windows(2) {
            if w[0] == w[1] {
                return Err(DatasetError::DuplicateDates { date: w[0] });
            }
            if w[0] > w[1] {
                return Err(DatasetError::Unordered {
                    earlier: w[1],
                    later: w[0],
                });
            }
        }
        Ok(())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a validated dataset.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, company: &str) -> Option<&[f64]> {
        self.companies
            .iter()
            .position(|c| c == company)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Values across all companies for one row.
    pub fn row(&self, index: usize) -> Option<(NaiveDate, Vec<f64>)> {
        let date = *self.dates.get(index)?;
        Some((date, self.columns.iter().map(|c| c[index]).collect()))
    }

    /// Keep rows whose index satisfies `keep`. Fails if nothing is left.
    fn select_rows(&self, keep: impl Fn(usize) -> bool) -> Result<Self, DatasetError> {
        let rows: Vec<usize> = (0..self.dates.len()).filter(|&i| keep(i)).collect();
        let dates = rows.iter().map(|&i| self.dates[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|col| rows.iter().map(|&i| col[i]).collect())
            .collect();
        Self::new(dates, self.companies.clone(), columns)
    }

    /// Rows inside the study window.
    pub fn restrict(&self, window: &StudyWindow) -> Result<Self, DatasetError> {
        self.select_rows(|i| window.contains(self.dates[i]))
    }

    /// Split into one dataset per 4-month bucket, in chronological order.
    pub fn partition_by_bucket(&self) -> BTreeMap<QuarterBucket, BalancedDataset> {
        let mut rows_by_bucket: BTreeMap<QuarterBucket, Vec<usize>> = BTreeMap::new();
        for (i, date) in self.dates.iter().enumerate() {
            rows_by_bucket
                .entry(QuarterBucket::of(*date))
                .or_default()
                .push(i);
        }

        rows_by_bucket
            .into_iter()
            .map(|(bucket, rows)| {
                // Subsets of a valid dataset are valid and non-empty by construction.
                let part = Self {
                    dates: rows.iter().map(|&i| self.dates[i]).collect(),
                    companies: self.companies.clone(),
                    columns: self
                        .columns
                        .iter()
                        .map(|col| rows.iter().map(|&i| col[i]).collect())
                        .collect(),
                };
                (bucket, part)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> BalancedDataset {
        BalancedDataset::new(
            vec![d(2023, 4, 28), d(2023, 5, 2), d(2023, 9, 1)],
            vec!["HCL".into(), "TCS".into()],
            vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]],
        )
        .unwrap()
    }

    #[test]
    fn valid_dataset_builds() {
        let ds = sample();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column("TCS"), Some(&[10.0, 20.0, 30.0][..]));
        assert_eq!(ds.column("Wipro"), None);
        assert_eq!(ds.row(1), Some((d(2023, 5, 2), vec![2.0, 20.0])));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let err = BalancedDataset::new(vec![], vec!["HCL".into()], vec![vec![]]).unwrap_err();
        assert_eq!(err, DatasetError::Empty);
    }

    #[test]
    fn nan_is_a_missing_value() {
        let err = BalancedDataset::new(
            vec![d(2023, 1, 3)],
            vec!["HCL".into()],
            vec![vec![f64::NAN]],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::MissingValues { .. }));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let err = BalancedDataset::new(
            vec![d(2023, 1, 3), d(2023, 1, 3)],
            vec!["HCL".into()],
            vec![vec![1.0, 2.0]],
        )
        .unwrap_err();
        assert_eq!(err, DatasetError::DuplicateDates { date: d(2023, 1, 3) });
    }

    #[test]
    fn restrict_to_window() {
        let w = StudyWindow::new(d(2023, 5, 1), d(2023, 12, 31)).unwrap();
        let r = sample().restrict(&w).unwrap();
        assert_eq!(r.dates(), &[d(2023, 5, 2), d(2023, 9, 1)]);
        assert_eq!(r.column("HCL"), Some(&[2.0, 3.0][..]));
    }

    #[test]
    fn restrict_outside_window_is_empty_error() {
        let w = StudyWindow::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap();
        assert_eq!(sample().restrict(&w).unwrap_err(), DatasetError::Empty);
    }

    #[test]
    fn partition_groups_rows_by_bucket() {
        let parts = sample().partition_by_bucket();
        let labels: Vec<String> = parts.keys().map(|b| b.label()).collect();
        assert_eq!(labels, ["2023_Q1", "2023_Q2", "2023_Q3"]);
        for part in parts.values() {
            assert_eq!(part.len(), 1);
            assert!(part.validate().is_ok());
        }
    }
}
