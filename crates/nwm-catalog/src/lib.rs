//! Lazy, backend-agnostic catalog of National Water Model output.
//!
//! NWM output is published as one directory per forecast day, one sub-directory per
//! configuration, and one NetCDF file per output step:
//!
//! ```text
//! nwm.20200821/
//!     short_range/
//!         nwm.t06z.short_range.channel_rt.f001.conus.nc
//!     medium_range_mem3/
//!         nwm.t00z.medium_range.channel_rt_3.f003.conus.nc
//! ```
//!
//! This crate mirrors that layout as a [`Catalog`] of [`Day`]s of [`Configuration`]s of
//! [`File`]s. Each level is enumerated through a [`CatalogLoader`] the first time it is
//! read, from either a local directory tree ([`LocalLoader`]) or a NOMADS-style HTML
//! listing ([`RemoteLoader`]). File attributes are taken from the file name alone.
//!
//! ```no_run
//! use nwm_catalog::{Explorer, FileFilter};
//!
//! # async fn run() -> nwm_catalog::CatalogResult<()> {
//! let explorer = Explorer::new(None, "remote")?;
//! let catalog = explorer.explore().await?;
//!
//! for series in catalog.all_time_series("short_range", "channel_rt").await? {
//!     println!("{}", series);
//! }
//!
//! let conus = catalog.file_count(&FileFilter::new().with_area("conus")).await?;
//! println!("{} files over CONUS", conus);
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod config;
pub mod discovery;
pub mod error;
pub mod explorer;
pub mod loader;
pub mod query;
pub mod snapshot;
pub mod tree;

pub use attributes::{extract_attributes, FileAttributes};
pub use config::{ExplorerConfig, DEFAULT_NOMADS_ADDRESS};
pub use discovery::{DiscoveryDepth, DiscoveryOptions, DiscoveryReport};
pub use error::{AttributeError, CatalogError, CatalogResult, DiscoveryFailure};
pub use explorer::{Explorer, ExplorerKind};
pub use loader::{
    CatalogLoader, ConfigurationListing, DayListing, FileListing, LocalLoader, RemoteLoader,
    RemoteSettings,
};
pub use query::{FileFilter, TimeSeries};
pub use snapshot::{CatalogSnapshot, ConfigurationSnapshot, DaySnapshot};
pub use tree::{Catalog, Configuration, Day, DayId, Entries, File};
