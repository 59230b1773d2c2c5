//! 4-month buckets: each calendar year splits into Jan–Apr, May–Aug, Sep–Dec.
//!
//! Buckets are called "quarters" in the output tables (`2023_Q1`), but each
//! spans four months, not three.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Months per bucket.
pub const BUCKET_MONTHS: u32 = 4;

#[derive(Debug, Error, PartialEq)]
pub enum BucketError {
    #[error("bucket number {0} out of range (expected 1..=3)")]
    NumberOutOfRange(u8),

    #[error("malformed bucket label '{0}' (expected YYYY_Qn)")]
    MalformedLabel(String),
}

/// A (year, bucket-number) pair. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuarterBucket {
    pub year: i32,
    pub number: u8,
}

impl QuarterBucket {
    pub fn new(year: i32, number: u8) -> Result<Self, BucketError> {
        if !(1..=3).contains(&number) {
            return Err(BucketError::NumberOutOfRange(number));
        }
        Ok(Self { year, number })
    }

    /// Bucket containing `date`: `((month - 1) / 4) + 1`.
    pub fn of(date: NaiveDate) -> Self {
        let number = ((date.month() - 1) / BUCKET_MONTHS + 1) as u8;
        Self {
            year: date.year(),
            number,
        }
    }

    /// Machine label used in tables and sheet names, e.g. `2023_Q1`.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Axis label used on charts, e.g. `2023 Q1`.
    pub fn pretty(&self) -> String {
        format!("{} Q{}", self.year, self.number)
    }

    /// First and last calendar month covered (1-based).
    pub fn months(&self) -> (u32, u32) {
        let first = (self.number as u32 - 1) * BUCKET_MONTHS + 1;
        (first, first + BUCKET_MONTHS - 1)
    }
}

impl fmt::Display for QuarterBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_Q{}", self.year, self.number)
    }
}

impl FromStr for QuarterBucket {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || BucketError::MalformedLabel(s.to_string());
        let (year, rest) = s.trim().split_once('_').ok_or_else(malformed)?;
        let number = rest.strip_prefix('Q').ok_or_else(malformed)?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let number: u8 = number.parse().map_err(|_| malformed())?;
        Self::new(year, number)
    }
}
