//! Full-period and per-bucket statistics over a balanced dataset.

pub mod descriptive;

pub use descriptive::{
    coefficient_of_variation, mean, median, mode_min, ols_slope_per_day, quantile_sorted,
    sample_sd, Summary,
};

use crate::domain::{BalancedDataset, QuarterBucket};
use serde::{Deserialize, Serialize};

/// Statistics for one company, optionally scoped to one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub bucket: Option<QuarterBucket>,
    pub company: String,
    pub summary: Summary,
}

fn rows_for(dataset: &BalancedDataset, bucket: Option<QuarterBucket>) -> Vec<StatRow> {
    dataset
        .companies()
        .iter()
        .zip(dataset.columns())
        .filter_map(|(company, column)| {
            Summary::compute(dataset.dates(), column).map(|summary| StatRow {
                bucket,
                company: company.clone(),
                summary,
            })
        })
        .collect()
}

/// One row per company in dataset column order.
pub fn full_period_stats(dataset: &BalancedDataset) -> Vec<StatRow> {
    rows_for(dataset, None)
}

/// One row per (bucket, company), sorted by bucket then company name.
///
/// Each bucket's slope is measured from that bucket's first date.
pub fn quarterly_stats(dataset: &BalancedDataset) -> Vec<StatRow> {
    let mut rows: Vec<StatRow> = dataset
        .partition_by_bucket()
        .into_iter()
        .flat_map(|(bucket, part)| rows_for(&part, Some(bucket)))
        .collect();
    rows.sort_by(|a, b| a.bucket.cmp(&b.bucket).then_with(|| a.company.cmp(&b.company)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dataset() -> BalancedDataset {
        BalancedDataset::new(
            vec![d(2023, 4, 28), d(2023, 5, 2), d(2023, 5, 3), d(2023, 9, 1)],
            vec!["Wipro".into(), "HCL".into()],
            vec![vec![400.0, 401.0, 403.0, 410.0], vec![1000.0, 1010.0, 1005.0, 1200.0]],
        )
        .unwrap()
    }

    #[test]
    fn full_period_rows_follow_column_order() {
        let rows = full_period_stats(&dataset());
        let names: Vec<&str> = rows.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(names, ["Wipro", "HCL"]);
        assert!(rows.iter().all(|r| r.bucket.is_none() && r.summary.count == 4));
    }

    #[test]
    fn quarterly_rows_sorted_by_bucket_then_company() {
        let rows = quarterly_stats(&dataset());
        let keys: Vec<(String, &str)> = rows
            .iter()
            .map(|r| (r.bucket.unwrap().label(), r.company.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2023_Q1".to_string(), "HCL"),
                ("2023_Q1".to_string(), "Wipro"),
                ("2023_Q2".to_string(), "HCL"),
                ("2023_Q2".to_string(), "Wipro"),
                ("2023_Q3".to_string(), "HCL"),
                ("2023_Q3".to_string(), "Wipro"),
            ]
        );
    }

    #[test]
    fn bucket_slope_origin_resets() {
        let rows = quarterly_stats(&dataset());
        let q2_wipro = rows
            .iter()
            .find(|r| r.company == "Wipro" && r.bucket.unwrap().label() == "2023_Q2")
            .unwrap();
        assert_eq!(q2_wipro.summary.count, 2);
        // 401 -> 403 over one day
        assert!((q2_wipro.summary.slope.unwrap() - 2.0).abs() < 1e-12);

        let q3 = rows
            .iter()
            .find(|r| r.company == "HCL" && r.bucket.unwrap().label() == "2023_Q3")
            .unwrap();
        assert_eq!(q3.summary.count, 1);
        assert_eq!(q3.summary.slope, None);
        assert_eq!(q3.summary.sd, None);
    }
}
