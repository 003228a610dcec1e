//! Root of the lazy NWM forecast tree.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use super::children::{Children, Entries};
use super::day::Day;
use super::file::File;
use crate::error::{CatalogError, CatalogResult};
use crate::loader::CatalogLoader;

/// Every forecast day available under a root address.
///
/// Nothing is enumerated until the catalog is first read. Days, configurations and
/// files are each fetched once, on demand, through the loader given at construction.
#[derive(Debug)]
pub struct Catalog {
    address: String,
    loader: Arc<dyn CatalogLoader>,
    days: Children<NaiveDate, Day>,
}

impl Catalog {
    pub fn new(address: impl Into<String>, loader: Arc<dyn CatalogLoader>) -> Self {
        Self {
            address: address.into(),
            loader,
            days: Children::new(),
        }
    }

    /// A loaded copy of this catalog holding only the given days.
    pub(crate) fn with_days(&self, days: HashMap<NaiveDate, Arc<Day>>) -> Self {
        Self {
            address: self.address.clone(),
            loader: Arc::clone(&self.loader),
            days: Children::loaded(days),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// The backend every container in this catalog enumerates through.
    pub fn loader(&self) -> &Arc<dyn CatalogLoader> {
        &self.loader
    }

    pub fn is_loaded(&self) -> bool {
        self.days.is_loaded()
    }

    #[instrument(skip(self), fields(address = %self.address))]
    async fn load_days(&self) -> CatalogResult<HashMap<NaiveDate, Arc<Day>>> {
        info!(loader = self.loader.name(), "Discovering forecast days");

        let listings = self.loader.list_days(&self.address).await?;
        let mut days = HashMap::with_capacity(listings.len());

        for listing in listings {
            let day = Day::from_listing(listing, Arc::clone(&self.loader));
            if let Some(previous) = days.insert(day.date(), Arc::new(day)) {
                warn!(
                    date = %previous.date_string(),
                    replaced = %previous.name(),
                    "Duplicate day listing; keeping the last one"
                );
            }
        }

        debug!(count = days.len(), "Loaded forecast days");
        Ok(days)
    }

    /// Enumerate the days now instead of on first read. Does nothing if already loaded.
    pub async fn load(&self) -> CatalogResult<()> {
        self.len().await.map(|_| ())
    }

    pub async fn get(&self, date: NaiveDate) -> CatalogResult<Option<Arc<Day>>> {
        self.days.get(&date, || self.load_days()).await
    }

    /// Add a day, replacing any day already stored under the date.
    pub async fn insert(&self, date: NaiveDate, day: impl Into<Arc<Day>>) -> CatalogResult<Option<Arc<Day>>> {
        let day = day.into();

        if date != day.date() {
            return Err(CatalogError::InvalidKey {
                container: "Catalog",
                message: format!("{} does not match the day's date {}", date, day.date_string()),
            });
        }

        Ok(self.days.insert(date, day).await)
    }

    pub async fn len(&self) -> CatalogResult<usize> {
        self.days.len(|| self.load_days()).await
    }

    pub async fn is_empty(&self) -> CatalogResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// A fresh iterator over `(date, day)` pairs, oldest first.
    pub async fn entries(&self) -> CatalogResult<Entries<NaiveDate, Day>> {
        self.days.entries(|| self.load_days()).await
    }

    /// Every file of every day. Enumerates the whole tree.
    pub async fn all_files(&self) -> CatalogResult<Vec<Arc<File>>> {
        let mut files = Vec::new();
        for (_, day) in self.entries().await? {
            files.extend(day.all_files().await?);
        }
        Ok(files)
    }

    pub(crate) async fn loaded_entries(&self) -> Option<Entries<NaiveDate, Day>> {
        self.days.peek().await
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.days.loaded_len() {
            Some(count) => write!(f, "{} (Days = {})", self.address, count),
            None => write!(f, "{} (Days = not loaded)", self.address),
        }
    }
}
