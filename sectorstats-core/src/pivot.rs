//! Bucket × company pivots of a single statistic.

use crate::domain::QuarterBucket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cell source for a pivot: `(bucket, company, value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotCell {
    pub bucket: QuarterBucket,
    pub company: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    /// Name of the pivoted statistic, e.g. `Mean`.
    pub statistic: String,
    pub buckets: Vec<QuarterBucket>,
    pub companies: Vec<String>,
    /// `values[bucket][company]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    /// Pivot `cells`.
    ///
    /// Buckets are chronological. Companies named in `preferred` come first in
    /// that order, then any others in the order they are first seen. Names in
    /// `preferred` with no cells are left out. A later cell for the same
    /// (bucket, company) replaces an earlier one.
    pub fn build(statistic: impl Into<String>, cells: &[PivotCell], preferred: &[String]) -> Self {
        let mut seen: Vec<String> = Vec::new();
        let mut by_key: BTreeMap<QuarterBucket, Vec<(String, Option<f64>)>> = BTreeMap::new();
        for cell in cells {
            if !seen.contains(&cell.company) {
                seen.push(cell.company.clone());
            }
            let row = by_key.entry(cell.bucket).or_default();
            match row.iter_mut().find(|(c, _)| *c == cell.company) {
                Some(slot) => slot.1 = cell.value,
                None => row.push((cell.company.clone(), cell.value)),
            }
        }

        let mut companies: Vec<String> = preferred
            .iter()
            .filter(|p| seen.contains(p))
            .cloned()
            .collect();
        for name in seen {
            if !companies.contains(&name) {
                companies.push(name);
            }
        }

        let buckets: Vec<QuarterBucket> = by_key.keys().copied().collect();
        let values = by_key
            .values()
            .map(|row| {
                companies
                    .iter()
                    .map(|c| row.iter().find(|(n, _)| n == c).and_then(|(_, v)| *v))
                    .collect()
            })
            .collect();

        Self {
            statistic: statistic.into(),
            buckets,
            companies,
            values,
        }
    }

    /// Values of one company across buckets.
    pub fn series(&self, company: &str) -> Option<Vec<Option<f64>>> {
        let c = self.companies.iter().position(|n| n == company)?;
        Some(self.values.iter().map(|row| row[c]).collect())
    }

    /// Whether any cell holds a value.
    pub fn has_values(&self) -> bool {
        self.values.iter().flatten().any(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(label: &str, company: &str, value: f64) -> PivotCell {
        PivotCell {
            bucket: label.parse().unwrap(),
            company: company.into(),
            value: Some(value),
        }
    }

    #[test]
    fn roster_order_then_encountered() {
        let cells = [
            cell("2024_Q1", "Zeta", 9.0),
            cell("2023_Q3", "TCS", 3.0),
            cell("2023_Q3", "HCL", 1.0),
            cell("2024_Q1", "HCL", 2.0),
        ];
        let preferred = vec!["HCL".to_string(), "Infosys".to_string(), "TCS".to_string()];
        let p = PivotTable::build("Mean", &cells, &preferred);

        assert_eq!(p.companies, ["HCL", "TCS", "Zeta"]);
        let labels: Vec<String> = p.buckets.iter().map(|b| b.label()).collect();
        assert_eq!(labels, ["2023_Q3", "2024_Q1"]);
        assert_eq!(p.values[0], vec![Some(1.0), Some(3.0), None]);
        assert_eq!(p.series("Zeta"), Some(vec![None, Some(9.0)]));
    }

    #[test]
    fn empty_cells_give_empty_table() {
        let p = PivotTable::build("SD", &[], &["HCL".to_string()]);
        assert!(p.buckets.is_empty());
        assert!(p.companies.is_empty());
        assert!(!p.has_values());
    }

    #[test]
    fn undefined_cells_leave_no_values() {
        let cells = [PivotCell {
            bucket: "2023_Q1".parse().unwrap(),
            company: "HCL".into(),
            value: None,
        }];
        let p = PivotTable::build("SD", &cells, &[]);
        assert_eq!(p.companies, ["HCL"]);
        assert!(!p.has_values());
        assert!(PivotTable::build("Mean", &[cell("2023_Q1", "HCL", 1.0)], &[]).has_values());
    }
}
