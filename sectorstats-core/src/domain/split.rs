//! Corporate split events found inside the study window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A split reported by the data source for one company.
///
/// Informational only: prices are never back-adjusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitEvent {
    pub company: String,
    pub symbol: String,
    pub date: NaiveDate,
    /// New shares per old share (2.0 for a 2:1 split).
    pub ratio: f64,
}
