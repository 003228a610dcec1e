//! In-memory enumeration backend that counts how often it is asked to list.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use nwm_catalog::{
    CatalogError, CatalogLoader, CatalogResult, ConfigurationListing, DayListing, FileListing,
};

use crate::fixtures::{configuration_dir, day_name};

/// Number of listing calls a [`StaticLoader`] has served, per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingCalls {
    pub days: usize,
    pub configurations: usize,
    pub files: usize,
}

/// A backend serving a fixed tree from memory.
///
/// Addresses are built as `{root}/{day}/{configuration}`. Addresses registered with
/// [`failing_at`](StaticLoader::failing_at) answer every listing with a discovery error.
#[derive(Debug)]
pub struct StaticLoader {
    root: String,
    days: Vec<DayListing>,
    configurations: HashMap<String, Vec<ConfigurationListing>>,
    files: HashMap<String, Vec<FileListing>>,
    failing: HashSet<String>,
    day_calls: AtomicUsize,
    configuration_calls: AtomicUsize,
    file_calls: AtomicUsize,
}

impl StaticLoader {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            days: Vec::new(),
            configurations: HashMap::new(),
            files: HashMap::new(),
            failing: HashSet::new(),
            day_calls: AtomicUsize::new(0),
            configuration_calls: AtomicUsize::new(0),
            file_calls: AtomicUsize::new(0),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn day_address(&self, date: NaiveDate) -> String {
        format!("{}/{}", self.root, day_name(date))
    }

    pub fn configuration_address(&self, date: NaiveDate, configuration_type: &str, member: Option<u64>) -> String {
        format!(
            "{}/{}",
            self.day_address(date),
            configuration_dir(configuration_type, member)
        )
    }

    /// Add an empty day.
    pub fn with_day(mut self, date: NaiveDate) -> Self {
        self.ensure_day(date);
        self
    }

    /// Add files to a configuration, creating the day and configuration as needed.
    pub fn with_files<I, S>(mut self, date: NaiveDate, configuration_type: &str, member: Option<u64>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let day_address = self.ensure_day(date);
        let address = self.configuration_address(date, configuration_type, member);

        let configurations = self.configurations.entry(day_address).or_default();
        if !configurations.iter().any(|c| c.address == address) {
            configurations.push(ConfigurationListing {
                configuration_type: configuration_type.to_string(),
                address: address.clone(),
                member,
            });
        }

        let files = self.files.entry(address.clone()).or_default();
        for name in names {
            let name = name.into();
            files.push(FileListing {
                address: format!("{}/{}", address, name),
                name,
            });
        }
        self
    }

    /// Make every listing of `address` fail.
    pub fn failing_at(mut self, address: impl Into<String>) -> Self {
        self.failing.insert(address.into());
        self
    }

    /// Listing calls served so far.
    pub fn calls(&self) -> ListingCalls {
        ListingCalls {
            days: self.day_calls.load(Ordering::SeqCst),
            configurations: self.configuration_calls.load(Ordering::SeqCst),
            files: self.file_calls.load(Ordering::SeqCst),
        }
    }

    fn ensure_day(&mut self, date: NaiveDate) -> String {
        let address = self.day_address(date);
        if !self.days.iter().any(|day| day.date == date) {
            self.days.push(DayListing {
                date,
                name: day_name(date),
                address: address.clone(),
            });
        }
        address
    }

    fn check(&self, address: &str) -> CatalogResult<()> {
        if self.failing.contains(address) {
            let failure = std::io::Error::new(std::io::ErrorKind::NotFound, "listing disabled for test");
            return Err(CatalogError::Discovery {
                address: address.to_string(),
                failure: failure.into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogLoader for StaticLoader {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn list_days(&self, root: &str) -> CatalogResult<Vec<DayListing>> {
        self.day_calls.fetch_add(1, Ordering::SeqCst);
        self.check(root)?;
        tokio::task::yield_now().await;

        if root != self.root {
            return Ok(Vec::new());
        }
        Ok(self.days.clone())
    }

    async fn list_configurations(&self, day_address: &str) -> CatalogResult<Vec<ConfigurationListing>> {
        self.configuration_calls.fetch_add(1, Ordering::SeqCst);
        self.check(day_address)?;
        tokio::task::yield_now().await;

        Ok(self.configurations.get(day_address).cloned().unwrap_or_default())
    }

    async fn list_files(&self, configuration_address: &str) -> CatalogResult<Vec<FileListing>> {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        self.check(configuration_address)?;
        tokio::task::yield_now().await;

        Ok(self.files.get(configuration_address).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{names, sample_date};

    #[tokio::test]
    async fn test_static_loader_serves_and_counts() {
        let date = sample_date();
        let loader = StaticLoader::new("mem://nwm")
            .with_files(date, "short_range", None, [names::SHORT_RANGE_CHANNEL])
            .failing_at("mem://nwm/nwm.20200822");

        let days = loader.list_days("mem://nwm").await.unwrap();
        assert_eq!(days.len(), 1);

        let configurations = loader.list_configurations(&days[0].address).await.unwrap();
        assert_eq!(configurations[0].address, "mem://nwm/nwm.20200821/short_range");

        let files = loader.list_files(&configurations[0].address).await.unwrap();
        assert_eq!(files[0].name, names::SHORT_RANGE_CHANNEL);

        let err = loader.list_configurations("mem://nwm/nwm.20200822").await.unwrap_err();
        assert!(err.is_discovery());

        assert_eq!(
            loader.calls(),
            ListingCalls {
                days: 1,
                configurations: 2,
                files: 1
            }
        );
    }
}
