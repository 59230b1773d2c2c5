//! Property tests for dataset and statistics invariants.
//!
//! Uses proptest to verify:
//! 1. Bucket totality: every date maps to exactly one bucket whose label parses back
//! 2. Balancing: the result is gap-free, ascending and a subset of every input
//! 3. Correlation: matrices are symmetric, bounded and unit-diagonal
//! 4. Statistics: order statistics are consistent with each other

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use sectorstats_core::correlation::CorrelationMatrix;
use sectorstats_core::data::balance_series;
use sectorstats_core::domain::{
    BalancedDataset, PricePoint, QuarterBucket, StudyWindow, TickerSeries,
};
use sectorstats_core::stats::Summary;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + chrono::Duration::days(offset)
    })
}

fn arb_price() -> impl Strategy<Value = f64> {
    (10.0..5000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

/// A series over a random subset of the first 60 days of 2024.
fn arb_series(company: &'static str) -> impl Strategy<Value = TickerSeries> {
    prop::collection::btree_map(0i64..60, arb_price(), 1..40).prop_map(move |points| {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        TickerSeries::new(
            company,
            format!("{company}.NS"),
            points
                .into_iter()
                .map(|(day, close)| PricePoint::new(start + chrono::Duration::days(day), close))
                .collect(),
        )
    })
}

// ── 1. Bucket totality ───────────────────────────────────────────────

proptest! {
    #[test]
    fn every_date_has_one_bucket_and_label_round_trips(date in arb_date()) {
        let bucket = QuarterBucket::of(date);
        prop_assert_eq!(bucket.year, date.year());
        prop_assert!((1..=3).contains(&bucket.number));
        let (first, last) = bucket.months();
        prop_assert!(first <= date.month() && date.month() <= last);
        prop_assert_eq!(bucket.label().parse::<QuarterBucket>().unwrap(), bucket);
    }

    #[test]
    fn bucket_order_is_chronological(a in arb_date(), b in arb_date()) {
        if a <= b {
            prop_assert!(QuarterBucket::of(a) <= QuarterBucket::of(b));
        }
    }
}

// ── 2. Balancing ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn balanced_rows_are_common_to_every_series(
        a in arb_series("A"),
        b in arb_series("B"),
        c in arb_series("C"),
    ) {
        let window = StudyWindow::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        ).unwrap();
        let inputs = [a, b, c];

        match balance_series(&inputs, &window) {
            Ok(out) => {
                let ds = &out.dataset;
                prop_assert!(ds.validate().is_ok());
                prop_assert!(ds.dates().windows(2).all(|w| w[0] < w[1]));
                for (i, s) in inputs.iter().enumerate() {
                    for (row, date) in ds.dates().iter().enumerate() {
                        let point = s.points.iter().find(|p| p.date == *date);
                        prop_assert_eq!(point.map(|p| p.close), Some(ds.columns()[i][row]));
                    }
                }
                prop_assert!(out.rows_in_window >= ds.len());
            }
            Err(_) => {
                let common = inputs[0].points.iter().any(|p| {
                    inputs[1..].iter().all(|s| s.points.iter().any(|q| q.date == p.date))
                });
                prop_assert!(!common);
            }
        }
    }
}

// ── 3. Correlation ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn correlation_matrix_is_symmetric_and_bounded(
        cols in prop::collection::vec(prop::collection::vec(arb_price(), 12), 2..5)
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..12).map(|i| start + chrono::Duration::days(i)).collect();
        let names = (0..cols.len()).map(|i| format!("C{i}")).collect();
        let ds = BalancedDataset::new(dates, names, cols).unwrap();
        let m = CorrelationMatrix::of("Pooled", &ds);

        for i in 0..m.companies.len() {
            for j in 0..m.companies.len() {
                prop_assert_eq!(m.values[i][j], m.values[j][i]);
                if let Some(r) = m.values[i][j] {
                    prop_assert!((-1.0..=1.0).contains(&r));
                }
            }
            if let Some(diag) = m.values[i][i] {
                prop_assert_eq!(diag, 1.0);
            }
        }
    }
}

// ── 4. Statistics ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn order_statistics_are_consistent(values in prop::collection::vec(arb_price(), 1..80)) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..values.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        let s = Summary::compute(&dates, &values).unwrap();

        prop_assert!(s.min <= s.q1 && s.q1 <= s.q2 && s.q2 <= s.q3 && s.q3 <= s.max);
        prop_assert_eq!(s.median, s.q2);
        prop_assert!(s.min <= s.mean + 1e-9 && s.mean <= s.max + 1e-9);
        prop_assert!(s.iqr >= 0.0 && s.range >= 0.0);
        prop_assert_eq!(s.sd.is_some(), values.len() >= 2);
        if let Some(mode) = s.mode {
            prop_assert!(values.iter().filter(|v| **v == mode).count() >= 2);
        }
    }
}
