//! Domain types for the sector statistics pipeline.

pub mod bucket;
pub mod company;
pub mod dataset;
pub mod series;
pub mod split;
pub mod window;

pub use bucket::{BucketError, QuarterBucket};
pub use company::{default_roster, validate_roster, Company, RosterError};
pub use dataset::{BalancedDataset, DatasetError};
pub use series::{PricePoint, TickerSeries};
pub use split::SplitEvent;
pub use window::{StudyWindow, WindowError};
