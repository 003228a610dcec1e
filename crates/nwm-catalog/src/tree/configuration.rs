//! A single configuration of the National Water Model within one day.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use super::children::{Children, Entries};
use super::day::DayId;
use super::file::File;
use crate::error::{CatalogError, CatalogResult};
use crate::loader::{CatalogLoader, ConfigurationListing};

/// Key under which a configuration is stored in its day.
///
/// Ensemble members of the same configuration are siblings, so each member is keyed
/// as `{configuration_type}_mem{member}` to keep them apart.
pub fn configuration_key(configuration_type: &str, member: Option<u64>) -> String {
    match member {
        Some(member) => format!("{}_mem{}", configuration_type, member),
        None => configuration_type.to_string(),
    }
}

/// The files of one forecast configuration (short range, medium range member 3, ...).
///
/// Files are fetched from the backend the first time they are needed.
#[derive(Debug)]
pub struct Configuration {
    configuration_type: String,
    address: String,
    member: Option<u64>,
    day: DayId,
    loader: Arc<dyn CatalogLoader>,
    files: Children<String, File>,
}

impl Configuration {
    pub fn new(
        configuration_type: impl Into<String>,
        address: impl Into<String>,
        member: Option<u64>,
        day: DayId,
        loader: Arc<dyn CatalogLoader>,
    ) -> Self {
        Self {
            configuration_type: configuration_type.into(),
            address: address.into(),
            member,
            day,
            loader,
            files: Children::new(),
        }
    }

    pub(crate) fn from_listing(
        listing: ConfigurationListing,
        day: DayId,
        loader: Arc<dyn CatalogLoader>,
    ) -> Self {
        Self::new(listing.configuration_type, listing.address, listing.member, day, loader)
    }

    /// A loaded copy of this configuration holding only the given files.
    pub(crate) fn with_files(&self, files: HashMap<String, Arc<File>>) -> Self {
        Self {
            configuration_type: self.configuration_type.clone(),
            address: self.address.clone(),
            member: self.member,
            day: self.day.clone(),
            loader: Arc::clone(&self.loader),
            files: Children::loaded(files),
        }
    }

    /// Name of the configuration, e.g. `short_range`.
    pub fn configuration_type(&self) -> &str {
        &self.configuration_type
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Ensemble member shared by every file in this configuration.
    pub fn member(&self) -> Option<u64> {
        self.member
    }

    /// The day this configuration belongs to.
    pub fn day(&self) -> &DayId {
        &self.day
    }

    pub fn date(&self) -> NaiveDate {
        self.day.date
    }

    /// Key of this configuration within its day.
    pub fn key(&self) -> String {
        configuration_key(&self.configuration_type, self.member)
    }

    /// Whether the files have been fetched (or inserted) yet.
    pub fn is_loaded(&self) -> bool {
        self.files.is_loaded()
    }

    #[instrument(skip(self), fields(configuration = %self.key(), address = %self.address))]
    async fn load_files(&self) -> CatalogResult<HashMap<String, Arc<File>>> {
        debug!(loader = self.loader.name(), "Loading files");

        let listings = self.loader.list_files(&self.address).await?;
        let mut files = HashMap::with_capacity(listings.len());

        for listing in listings {
            match File::try_from(listing) {
                Ok(file) if file.member != self.member => {
                    warn!(
                        file = %file.name,
                        file_member = ?file.member,
                        "Skipping file belonging to a different ensemble member"
                    );
                }
                Ok(file) => {
                    files.insert(file.name.clone(), Arc::new(file));
                }
                Err(e) => {
                    warn!(error = %e, "Skipping file with an unrecognized name");
                }
            }
        }

        debug!(count = files.len(), "Loaded files");
        Ok(files)
    }

    /// Look up a file by name.
    pub async fn get(&self, name: &str) -> CatalogResult<Option<Arc<File>>> {
        self.files.get(name, || self.load_files()).await
    }

    /// Add a file, replacing any file already stored under the name.
    ///
    /// The key must be the file's name and the file must belong to the same ensemble
    /// member as the configuration.
    pub async fn insert(
        &self,
        name: impl Into<String>,
        file: impl Into<Arc<File>>,
    ) -> CatalogResult<Option<Arc<File>>> {
        let name = name.into();
        let file = file.into();

        let key_problem = (name != file.name)
            .then(|| format!("'{}' does not match the file name '{}'", name, file.name));
        let value_problem = (file.member != self.member).then(|| {
            format!(
                "file member {:?} does not match configuration member {:?}",
                file.member, self.member
            )
        });

        if let Some(err) = CatalogError::for_entry("Configuration", key_problem, value_problem) {
            return Err(err);
        }

        Ok(self.files.insert(name, file).await)
    }

    /// Number of files in the configuration.
    pub async fn len(&self) -> CatalogResult<usize> {
        self.files.len(|| self.load_files()).await
    }

    pub async fn is_empty(&self) -> CatalogResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// A fresh iterator over `(name, file)` pairs, ordered by name.
    pub async fn entries(&self) -> CatalogResult<Entries<String, File>> {
        self.files.entries(|| self.load_files()).await
    }

    /// Every file in the configuration.
    pub async fn all_files(&self) -> CatalogResult<Vec<Arc<File>>> {
        Ok(self.entries().await?.map(|(_, file)| file).collect())
    }

    pub(crate) async fn loaded_entries(&self) -> Option<Entries<String, File>> {
        self.files.peek().await
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.configuration_type)?;

        if let Some(member) = self.member {
            write!(f, ", Member {}", member)?;
        }

        match self.files.loaded_len() {
            Some(count) => write!(f, " (files = {})", count),
            None => write!(f, " (files = not loaded)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LocalLoader;

    fn day() -> DayId {
        DayId::new(NaiveDate::from_ymd_opt(2020, 8, 21).unwrap(), "nwm.20200821")
    }

    fn unbacked(member: Option<u64>) -> Configuration {
        Configuration::new(
            "medium_range",
            "/nonexistent/nwm.20200821/medium_range",
            member,
            day(),
            Arc::new(LocalLoader::new()),
        )
    }

    #[test]
    fn test_configuration_key() {
        assert_eq!(configuration_key("short_range", None), "short_range");
        assert_eq!(configuration_key("medium_range", Some(3)), "medium_range_mem3");
    }

    #[tokio::test]
    async fn test_insert_validates_key_and_member() {
        let configuration = unbacked(Some(1));
        let file = Arc::new(File::parse("nwm.t00z.medium_range.land_1.f003.conus.nc", "x").unwrap());
        let other = Arc::new(File::parse("nwm.t00z.medium_range.land_2.f003.conus.nc", "y").unwrap());

        assert!(configuration.insert(file.name.clone(), Arc::clone(&file)).await.unwrap().is_none());

        let err = configuration.insert("wrong", Arc::clone(&file)).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidKey { .. }));

        let err = configuration.insert(other.name.clone(), Arc::clone(&other)).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidValue { .. }));

        let err = configuration.insert("wrong", other).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { .. }));
    }

    #[tokio::test]
    async fn test_insert_counts_as_loaded() {
        // The address does not exist, so any fetch would fail
        let configuration = unbacked(None);
        let file = File::parse("nwm.t00z.medium_range.land.f003.conus.nc", "x").unwrap();
        configuration.insert(file.name.clone(), file).await.unwrap();

        assert!(configuration.is_loaded());
        assert_eq!(configuration.len().await.unwrap(), 1);
        assert!(configuration.get("missing.nc").await.unwrap().is_none());
        assert_eq!(configuration.to_string(), "medium_range (files = 1)");
    }

    #[tokio::test]
    async fn test_unreachable_configuration_reports_address() {
        let configuration = unbacked(Some(2));
        assert_eq!(configuration.to_string(), "medium_range, Member 2 (files = not loaded)");

        let err = configuration.len().await.unwrap_err();
        assert_eq!(err.address(), Some("/nonexistent/nwm.20200821/medium_range"));
        assert!(!configuration.is_loaded());
    }
}
