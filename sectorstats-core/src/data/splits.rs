//! Split check: which reported splits fall inside the study window.

use super::provider::SplitRecord;
use crate::domain::{SplitEvent, StudyWindow};

/// Keep the records dated inside `window` (inclusive) and tag them with the company.
pub fn splits_in_window(
    company: &str,
    symbol: &str,
    records: &[SplitRecord],
    window: &StudyWindow,
) -> Vec<SplitEvent> {
    records
        .iter()
        .filter(|r| window.contains(r.date))
        .map(|r| SplitEvent {
            company: company.to_string(),
            symbol: symbol.to_string(),
            date: r.date,
            ratio: r.ratio,
        })
        .collect()
}
