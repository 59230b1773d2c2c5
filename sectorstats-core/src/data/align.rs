//! Multi-company time alignment and balancing.
//!
//! Companies are outer-joined on date (a missing observation is `None`, never
//! forward-filled), restricted to the study window, and then reduced to the
//! complete rows: the dates on which every company has a close.

use crate::domain::{BalancedDataset, DatasetError, StudyWindow, TickerSeries};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Outer-joined closes on the union of all dates.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    pub dates: Vec<NaiveDate>,
    pub companies: Vec<String>,
    /// Column-major, `columns[c][row]`; `None` where a company has no close.
    pub columns: Vec<Vec<Option<f64>>>,
}

impl AlignedTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Rows inside the closed window.
    pub fn restrict(&self, window: &StudyWindow) -> AlignedTable {
        let keep: Vec<usize> = (0..self.dates.len())
            .filter(|&i| window.contains(self.dates[i]))
            .collect();
        AlignedTable {
            dates: keep.iter().map(|&i| self.dates[i]).collect(),
            companies: self.companies.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| keep.iter().map(|&i| col[i]).collect())
                .collect(),
        }
    }

    /// Keep only rows where every company has a value, then validate.
    pub fn balance(&self) -> Result<BalancedDataset, DatasetError> {
        let complete: Vec<usize> = (0..self.dates.len())
            .filter(|&i| self.columns.iter().all(|col| col[i].is_some()))
            .collect();

        let dates = complete.iter().map(|&i| self.dates[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|col| {
                complete
                    .iter()
                    .map(|&i| col[i].unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();

        BalancedDataset::new(dates, self.companies.clone(), columns)
    }
}

/// Outer-join every series on date.
///
/// A series that holds the same date twice cannot be aligned and is reported
/// as a duplicate-date violation.
pub fn align_series(series: &[TickerSeries]) -> Result<AlignedTable, DatasetError> {
    let n = series.len();
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();

    for (c, s) in series.iter().enumerate() {
        for point in &s.points {
            let row = rows.entry(point.date).or_insert_with(|| vec![None; n]);
            if row[c].is_some() {
                return Err(DatasetError::DuplicateDates { date: point.date });
            }
            row[c] = Some(point.close);
        }
    }

    let dates: Vec<NaiveDate> = rows.keys().copied().collect();
    let mut columns = vec![Vec::with_capacity(dates.len()); n];
    for values in rows.into_values() {
        for (c, v) in values.into_iter().enumerate() {
            columns[c].push(v);
        }
    }

    Ok(AlignedTable {
        dates,
        companies: series.iter().map(|s| s.company.clone()).collect(),
        columns,
    })
}

/// Counts reported alongside a balanced dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceOutcome {
    /// Union-of-dates rows inside the window, before balancing.
    pub rows_in_window: usize,
    pub dataset: BalancedDataset,
}

impl BalanceOutcome {
    pub fn dropped_rows(&self) -> usize {
        self.rows_in_window - self.dataset.len()
    }
}

/// Align, restrict to `window`, and balance.
pub fn balance_series(
    series: &[TickerSeries],
    window: &StudyWindow,
) -> Result<BalanceOutcome, DatasetError> {
    let aligned = align_series(series)?.restrict(window);
    let dataset = aligned.balance()?;
    tracing::info!(
        rows_in_window = aligned.len(),
        balanced_rows = dataset.len(),
        "balanced dataset"
    );
    Ok(BalanceOutcome {
        rows_in_window: aligned.len(),
        dataset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(company: &str, points: &[(u32, f64)]) -> TickerSeries {
        TickerSeries::new(
            company,
            format!("{company}.NS"),
            points.iter().map(|&(day, c)| PricePoint::new(d(day), c)).collect(),
        )
    }

    #[test]
    fn align_fills_missing_with_none() {
        let aligned = align_series(&[
            series("A", &[(2, 100.0), (3, 101.0), (4, 102.0)]),
            series("B", &[(2, 200.0), (4, 202.0)]),
        ])
        .unwrap();

        assert_eq!(aligned.dates, vec![d(2), d(3), d(4)]);
        assert_eq!(aligned.columns[0][1], Some(101.0));
        assert_eq!(aligned.columns[1][1], None);
    }

    #[test]
    fn balance_keeps_only_common_dates() {
        let w = StudyWindow::new(d(1), d(31)).unwrap();
        let out = balance_series(
            &[
                series("A", &[(2, 100.0), (3, 101.0), (4, 102.0)]),
                series("B", &[(2, 200.0), (4, 202.0), (5, 203.0)]),
            ],
            &w,
        )
        .unwrap();

        assert_eq!(out.rows_in_window, 4);
        assert_eq!(out.dataset.dates(), &[d(2), d(4)]);
        assert_eq!(out.dataset.column("B"), Some(&[200.0, 202.0][..]));
        assert_eq!(out.dropped_rows(), 2);
    }

    #[test]
    fn window_is_applied_before_balancing() {
        let w = StudyWindow::new(d(3), d(4)).unwrap();
        let out = balance_series(
            &[
                series("A", &[(2, 1.0), (3, 2.0), (4, 3.0)]),
                series("B", &[(2, 1.0), (3, 2.0), (4, 3.0), (5, 4.0)]),
            ],
            &w,
        )
        .unwrap();
        assert_eq!(out.rows_in_window, 2);
        assert_eq!(out.dataset.dates(), &[d(3), d(4)]);
    }

    #[test]
    fn disjoint_series_fail_as_empty() {
        let w = StudyWindow::new(d(1), d(31)).unwrap();
        let err = balance_series(&[series("A", &[(2, 1.0)]), series("B", &[(3, 1.0)])], &w)
            .unwrap_err();
        assert_eq!(err, DatasetError::Empty);
    }

    #[test]
    fn duplicate_raw_dates_are_rejected() {
        let err = align_series(&[series("A", &[(2, 1.0), (2, 1.5)])]).unwrap_err();
        assert_eq!(err, DatasetError::DuplicateDates { date: d(2) });
    }
}
