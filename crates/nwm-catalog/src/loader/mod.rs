//! Enumeration backends that list days, configurations, and files.
//!
//! A [`CatalogLoader`] is injected once at the root of a [`Catalog`](crate::Catalog)
//! and handed down to every container it lazily creates, so the tree never needs
//! to know whether it is backed by a local directory tree or a NOMADS listing.

mod listing;
mod local;
mod remote;

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::attributes::split_member;
use crate::error::{AttributeError, CatalogResult};

pub use listing::{parse_anchors, Anchor};
pub use local::LocalLoader;
pub use remote::{RemoteLoader, RemoteSettings};

/// Prefix every NWM day directory starts with.
pub const DAY_PREFIX: &str = "nwm";

/// Extension of the files a configuration is made of.
pub const FILE_EXTENSION: &str = ".nc";

const DAY_FORMAT: &str = "%Y%m%d";

/// A day discovered under a catalog root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayListing {
    pub date: NaiveDate,
    pub name: String,
    pub address: String,
}

/// A configuration discovered under a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationListing {
    pub configuration_type: String,
    pub address: String,
    pub member: Option<u64>,
}

/// A file discovered under a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListing {
    pub name: String,
    pub address: String,
}

/// Capability set every enumeration backend provides.
#[async_trait]
pub trait CatalogLoader: Send + Sync + fmt::Debug {
    /// Short name of the backend, used in logs.
    fn name(&self) -> &'static str;

    /// List the forecast days available under a catalog root.
    async fn list_days(&self, root: &str) -> CatalogResult<Vec<DayListing>>;

    /// List the configurations available for a day.
    async fn list_configurations(&self, day_address: &str) -> CatalogResult<Vec<ConfigurationListing>>;

    /// List the `.nc` files available for a configuration.
    async fn list_files(&self, configuration_address: &str) -> CatalogResult<Vec<FileListing>>;
}

/// Interpret a directory or listing entry as a forecast day.
///
/// Returns `None` if the entry is not an NWM day (no `nwm` prefix). The date is read
/// from index 4 onward once a trailing `/` has been trimmed, so `nwm.20200821` and
/// `nwm.20200821/` both resolve to 2020-08-21.
pub fn parse_day_name(entry: &str) -> Option<Result<(NaiveDate, String), AttributeError>> {
    if !entry.starts_with(DAY_PREFIX) {
        return None;
    }

    let name = entry.trim_end_matches('/');
    let date = name
        .get(4..)
        .and_then(|stamp| NaiveDate::parse_from_str(stamp, DAY_FORMAT).ok())
        .ok_or_else(|| AttributeError::InvalidDate {
            name: entry.to_string(),
        });

    Some(date.map(|date| (date, name.to_string())))
}

/// Interpret a directory or listing entry as a configuration.
///
/// Ensemble members are encoded as `{configuration}_mem{member}`; the member is pulled
/// out and the `_mem{member}` suffix removed once.
pub fn parse_configuration_name(entry: &str) -> (String, Option<u64>) {
    let (configuration_type, member) = split_member(entry, "_mem");
    (configuration_type.trim_matches('/').to_string(), member)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day_name() {
        let (date, name) = parse_day_name("nwm.20200821/").unwrap().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 8, 21).unwrap());
        assert_eq!(name, "nwm.20200821");

        let (date, _) = parse_day_name("nwm.20201231").unwrap().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
    }

    #[test]
    fn test_parse_day_name_rejects() {
        assert!(parse_day_name("Parent Directory").is_none());
        assert!(parse_day_name("hrrr.20200821/").is_none());
        assert!(matches!(
            parse_day_name("nwm.latest/"),
            Some(Err(AttributeError::InvalidDate { .. }))
        ));
        assert!(matches!(parse_day_name("nwm"), Some(Err(_))));
    }

    #[test]
    fn test_parse_configuration_name() {
        assert_eq!(
            parse_configuration_name("short_range/"),
            ("short_range".to_string(), None)
        );
        assert_eq!(
            parse_configuration_name("medium_range_mem7/"),
            ("medium_range".to_string(), Some(7))
        );
        assert_eq!(
            parse_configuration_name("long_range_mem4"),
            ("long_range".to_string(), Some(4))
        );
    }
}
