//! sectorstats core: domain types, market data, statistics and correlations.
//!
//! This crate holds everything that does not touch the output formats:
//! - Domain types (series, study window, 4-month buckets, balanced dataset)
//! - Market-data providers (Yahoo chart API, seeded synthetic walk)
//! - Raw price files and the alignment that produces a balanced dataset
//! - Descriptive statistics, Pearson correlations and bucket pivots

pub mod correlation;
pub mod data;
pub mod domain;
pub mod pivot;
pub mod stats;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types handed between stages are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::PricePoint>();
        require_sync::<domain::PricePoint>();
        require_send::<domain::TickerSeries>();
        require_sync::<domain::TickerSeries>();
        require_send::<domain::StudyWindow>();
        require_sync::<domain::StudyWindow>();
        require_send::<domain::QuarterBucket>();
        require_sync::<domain::QuarterBucket>();
        require_send::<domain::BalancedDataset>();
        require_sync::<domain::BalancedDataset>();
        require_send::<domain::SplitEvent>();
        require_sync::<domain::SplitEvent>();
        require_send::<domain::Company>();
        require_sync::<domain::Company>();

        // Providers
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();

        // Results
        require_send::<stats::StatRow>();
        require_sync::<stats::StatRow>();
        require_send::<correlation::CorrelationMatrix>();
        require_sync::<correlation::CorrelationMatrix>();
        require_send::<pivot::PivotTable>();
        require_sync::<pivot::PivotTable>();
    }

    /// Providers are used behind `&dyn DataProvider`.
    #[test]
    fn data_provider_is_object_safe() {
        fn _takes_dyn(p: &dyn data::DataProvider) -> &str {
            p.name()
        }
        let synthetic = data::SyntheticProvider::new(7);
        assert_eq!(_takes_dyn(&synthetic), "synthetic");
    }
}
