//! Market data: providers, raw price files, alignment and the split check.

pub mod align;
pub mod atomic;
pub mod provider;
pub mod raw_file;
pub mod splits;
pub mod synthetic;
pub mod yahoo;

pub use align::{align_series, balance_series, AlignedTable, BalanceOutcome};
pub use atomic::write_atomic;
pub use provider::{
    DataError, DataProvider, DataSource, DownloadProgress, FetchResult, SilentProgress,
    SplitRecord, StdoutProgress,
};
pub use raw_file::{raw_path, read_raw_close, write_raw_csv, RawRead};
pub use splits::splits_in_window;
pub use synthetic::SyntheticProvider;
pub use yahoo::{YahooProvider, YahooSettings};
