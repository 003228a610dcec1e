//! A single forecast day and the configurations published for it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::children::{Children, Entries};
use super::configuration::Configuration;
use super::file::File;
use crate::error::{CatalogError, CatalogResult};
use crate::loader::{CatalogLoader, DayListing};

/// Identity of a day, shared by everything beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DayId {
    pub date: NaiveDate,
    /// Directory name the day was discovered under, e.g. `nwm.20200821`
    pub name: String,
}

impl DayId {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }

    /// The date formatted as `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date_string())
    }
}

/// All configurations produced on one day.
#[derive(Debug)]
pub struct Day {
    id: DayId,
    address: String,
    loader: Arc<dyn CatalogLoader>,
    configurations: Children<String, Configuration>,
}

impl Day {
    pub fn new(
        date: NaiveDate,
        name: impl Into<String>,
        address: impl Into<String>,
        loader: Arc<dyn CatalogLoader>,
    ) -> Self {
        Self {
            id: DayId::new(date, name),
            address: address.into(),
            loader,
            configurations: Children::new(),
        }
    }

    pub(crate) fn from_listing(listing: DayListing, loader: Arc<dyn CatalogLoader>) -> Self {
        Self::new(listing.date, listing.name, listing.address, loader)
    }

    /// A loaded copy of this day holding only the given configurations.
    pub(crate) fn with_configurations(&self, configurations: HashMap<String, Arc<Configuration>>) -> Self {
        Self {
            id: self.id.clone(),
            address: self.address.clone(),
            loader: Arc::clone(&self.loader),
            configurations: Children::loaded(configurations),
        }
    }

    pub fn id(&self) -> &DayId {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.id.date
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn date_string(&self) -> String {
        self.id.date_string()
    }

    pub fn is_loaded(&self) -> bool {
        self.configurations.is_loaded()
    }

    #[instrument(skip(self), fields(day = %self.id.name, address = %self.address))]
    async fn load_configurations(&self) -> CatalogResult<HashMap<String, Arc<Configuration>>> {
        debug!(loader = self.loader.name(), "Loading configurations");

        let listings = self.loader.list_configurations(&self.address).await?;
        let mut configurations = HashMap::with_capacity(listings.len());

        for listing in listings {
            let configuration =
                Configuration::from_listing(listing, self.id.clone(), Arc::clone(&self.loader));
            let key = configuration.key();

            if let Some(previous) = configurations.insert(key.clone(), Arc::new(configuration)) {
                warn!(
                    configuration = %key,
                    replaced = %previous.address(),
                    "Duplicate configuration listing; keeping the last one"
                );
            }
        }

        debug!(count = configurations.len(), "Loaded configurations");
        Ok(configurations)
    }

    /// Look up a configuration by key (`short_range`, `medium_range_mem3`, ...).
    pub async fn get(&self, key: &str) -> CatalogResult<Option<Arc<Configuration>>> {
        self.configurations.get(key, || self.load_configurations()).await
    }

    /// Add a configuration, replacing any configuration already stored under the key.
    pub async fn insert(
        &self,
        key: impl Into<String>,
        configuration: impl Into<Arc<Configuration>>,
    ) -> CatalogResult<Option<Arc<Configuration>>> {
        let key = key.into();
        let configuration = configuration.into();
        let expected = configuration.key();

        let key_problem = (key != expected)
            .then(|| format!("'{}' does not match the configuration key '{}'", key, expected));
        let value_problem = (configuration.date() != self.id.date).then(|| {
            format!(
                "configuration for {} cannot be added to {}",
                configuration.day().date_string(),
                self.date_string()
            )
        });

        if let Some(err) = CatalogError::for_entry("Day", key_problem, value_problem) {
            return Err(err);
        }

        Ok(self.configurations.insert(key, configuration).await)
    }

    pub async fn len(&self) -> CatalogResult<usize> {
        self.configurations.len(|| self.load_configurations()).await
    }

    pub async fn is_empty(&self) -> CatalogResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// A fresh iterator over `(key, configuration)` pairs, ordered by key.
    pub async fn entries(&self) -> CatalogResult<Entries<String, Configuration>> {
        self.configurations.entries(|| self.load_configurations()).await
    }

    /// Every configuration of the given type, including all ensemble members.
    pub async fn configurations_of_type(&self, configuration_type: &str) -> CatalogResult<Vec<Arc<Configuration>>> {
        Ok(self
            .entries()
            .await?
            .map(|(_, configuration)| configuration)
            .filter(|configuration| configuration.configuration_type() == configuration_type)
            .collect())
    }

    /// Every file of every configuration of this day.
    pub async fn all_files(&self) -> CatalogResult<Vec<Arc<File>>> {
        let mut files = Vec::new();
        for (_, configuration) in self.entries().await? {
            files.extend(configuration.all_files().await?);
        }
        Ok(files)
    }

    pub(crate) async fn loaded_entries(&self) -> Option<Entries<String, Configuration>> {
        self.configurations.peek().await
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.configurations.loaded_len() {
            Some(count) => write!(f, "{} (configurations = {})", self.date_string(), count),
            None => write!(f, "{} (configurations = not loaded)", self.date_string()),
        }
    }
}
