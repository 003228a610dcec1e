//! Filesystem backend for NWM data mirrored into a local directory tree.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument, warn};

use super::{
    parse_configuration_name, parse_day_name, CatalogLoader, ConfigurationListing, DayListing,
    FileListing, FILE_EXTENSION,
};
use crate::error::{CatalogError, CatalogResult};

/// Lists NWM days, configurations, and files from a local directory tree.
#[derive(Debug, Clone, Default)]
pub struct LocalLoader;

impl LocalLoader {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug)]
struct DirEntry {
    name: String,
    address: String,
    is_dir: bool,
    is_file: bool,
}

/// Read the immediate entries of a directory.
async fn read_entries(address: &str) -> CatalogResult<Vec<DirEntry>> {
    let directory = Path::new(address);
    let mut reader = fs::read_dir(directory)
        .await
        .map_err(|e| CatalogError::discovery(address, e))?;

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| CatalogError::discovery(address, e))?
    {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %entry.path().display(), "Skipping entry with a non UTF-8 name");
            continue;
        };

        // Follow symlinks so mirrored trees made of links behave like real ones
        let metadata = match fs::metadata(entry.path()).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        entries.push(DirEntry {
            address: directory.join(&name).to_string_lossy().into_owned(),
            name,
            is_dir: metadata.is_dir(),
            is_file: metadata.is_file(),
        });
    }

    Ok(entries)
}

#[async_trait]
impl CatalogLoader for LocalLoader {
    fn name(&self) -> &'static str {
        "local"
    }

    #[instrument(skip(self))]
    async fn list_days(&self, root: &str) -> CatalogResult<Vec<DayListing>> {
        let mut days = Vec::new();

        for entry in read_entries(root).await? {
            if !entry.is_dir {
                continue;
            }

            match parse_day_name(&entry.name) {
                Some(Ok((date, name))) => days.push(DayListing {
                    date,
                    name,
                    address: entry.address,
                }),
                Some(Err(e)) => warn!(error = %e, "Skipping day directory"),
                None => {}
            }
        }

        debug!(count = days.len(), "Listed local forecast days");
        Ok(days)
    }

    #[instrument(skip(self))]
    async fn list_configurations(&self, day_address: &str) -> CatalogResult<Vec<ConfigurationListing>> {
        let mut configurations = Vec::new();

        for entry in read_entries(day_address).await? {
            if !entry.is_dir {
                continue;
            }

            let (configuration_type, member) = parse_configuration_name(&entry.name);
            configurations.push(ConfigurationListing {
                configuration_type,
                address: entry.address,
                member,
            });
        }

        debug!(count = configurations.len(), "Listed local configurations");
        Ok(configurations)
    }

    #[instrument(skip(self))]
    async fn list_files(&self, configuration_address: &str) -> CatalogResult<Vec<FileListing>> {
        let files: Vec<FileListing> = read_entries(configuration_address)
            .await?
            .into_iter()
            .filter(|entry| entry.is_file && entry.name.ends_with(FILE_EXTENSION))
            .map(|entry| FileListing {
                name: entry.name,
                address: entry.address,
            })
            .collect();

        debug!(count = files.len(), "Listed local files");
        Ok(files)
    }
}
