//! Study window: the closed calendar range every stage works inside.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("window start {start} is after end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Closed date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StudyWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Exclusive upper bound for half-open source requests.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end.succ_opt().unwrap_or(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn contains_is_inclusive_at_both_ends() {
        let w = StudyWindow::new(d(2023, 1, 3), d(2024, 6, 28)).unwrap();
        assert!(w.contains(d(2023, 1, 3)));
        assert!(w.contains(d(2024, 6, 28)));
        assert!(!w.contains(d(2023, 1, 2)));
        assert!(!w.contains(d(2024, 6, 29)));
    }

    #[test]
    fn end_exclusive_is_next_day() {
        let w = StudyWindow::new(d(2023, 1, 3), d(2024, 6, 28)).unwrap();
        assert_eq!(w.end_exclusive(), d(2024, 6, 29));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = StudyWindow::new(d(2024, 1, 2), d(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, WindowError::Inverted { .. }));
    }
}
