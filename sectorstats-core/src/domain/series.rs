//! Price series: the per-company unit produced by the collector.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily close observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// A point is usable when its close is a finite number.
    pub fn is_valid(&self) -> bool {
        self.close.is_finite()
    }
}

/// Daily closes for a single company, ordered by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSeries {
    pub company: String,
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl TickerSeries {
    pub fn new(company: impl Into<String>, symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            company: company.into(),
            symbol: symbol.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sort by date. Stable, so rows sharing a date keep their file order.
    pub fn sort(&mut self) {
        self.points.sort_by_key(|p| p.date);
    }

    /// True when dates are strictly ascending (sorted, no duplicates).
    pub fn is_strictly_ascending(&self) -> bool {
        self.points.windows(2).all(|w| w[0].date < w[1].date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn sort_orders_points_by_date() {
        let mut s = TickerSeries::new(
            "TCS",
            "TCS.NS",
            vec![
                PricePoint::new(d(3), 2.0),
                PricePoint::new(d(1), 1.0),
                PricePoint::new(d(2), 3.0),
            ],
        );
        assert!(!s.is_strictly_ascending());
        s.sort();
        assert!(s.is_strictly_ascending());
        assert_eq!(s.first_date(), Some(d(1)));
        assert_eq!(s.last_date(), Some(d(3)));
    }

    #[test]
    fn duplicate_dates_are_not_strictly_ascending() {
        let s = TickerSeries::new(
            "TCS",
            "TCS.NS",
            vec![PricePoint::new(d(1), 1.0), PricePoint::new(d(1), 2.0)],
        );
        assert!(!s.is_strictly_ascending());
    }

    #[test]
    fn nan_close_is_invalid() {
        assert!(!PricePoint::new(d(1), f64::NAN).is_valid());
        assert!(PricePoint::new(d(1), 10.5).is_valid());
    }
}
