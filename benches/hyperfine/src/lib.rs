//! Results exported by `hyperfine --export-json` and their aggregation into a
//! single combined file.

pub mod combine;

pub use combine::{CombineSummary, combine, combine_dir, discover_result_files};
pub use error::ResultError;
pub use result::{ResultRecord, ResultSet};
