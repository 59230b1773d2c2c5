//! Synthetic provider for offline runs.
//!
//! Produces a deterministic random walk per symbol on weekdays. The walk is
//! derived from the master seed and the symbol name, so every run with the
//! same seed writes identical raw files. Synthetic symbols never split.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, SplitRecord};
use crate::domain::PricePoint;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SyntheticProvider {
    seed: u64,
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, symbol: &str) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    fn walk(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
        let mut rng = self.rng_for(symbol);
        let mut price: f64 = rng.gen_range(300.0..2000.0);
        let mut points = Vec::new();

        for date in start.iter_days().take_while(|d| *d < end) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            price *= 1.0 + rng.gen_range(-0.02..0.02);
            points.push(PricePoint::new(date, (price * 100.0).round() / 100.0));
        }
        points
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        Ok(FetchResult {
            symbol: symbol.to_string(),
            points: self.walk(symbol, start, end),
            source: DataSource::Synthetic,
        })
    }

    fn fetch_splits(&self, _symbol: &str) -> Result<Vec<SplitRecord>, DataError> {
        Ok(Vec::new())
    }

    fn is_available(&self) -> bool {
        true
    }
}
