//! Queries over the catalog tree: file counts, time series and selections.

mod filter;
mod select;
mod time_series;

pub use filter::FileFilter;
pub use time_series::TimeSeries;
