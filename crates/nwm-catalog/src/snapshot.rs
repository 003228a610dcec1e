//! Serializable projection of whatever part of a catalog has been loaded.
//!
//! Capturing never triggers enumeration: levels that were not loaded are left out.

use chrono::NaiveDate;
use serde::Serialize;

use crate::tree::{Catalog, Configuration, Day, File};

#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub address: String,
    pub days: Vec<DaySnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurations: Option<Vec<ConfigurationSnapshot>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationSnapshot {
    pub key: String,
    pub configuration_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<u64>,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<File>>,
}

impl CatalogSnapshot {
    /// Project the loaded part of a catalog. Days are ordered by date and every other
    /// level by key.
    pub async fn capture(catalog: &Catalog) -> Self {
        let mut days = Vec::new();

        if let Some(entries) = catalog.loaded_entries().await {
            for (_, day) in entries {
                days.push(DaySnapshot::capture(&day).await);
            }
        }

        Self {
            address: catalog.address().to_string(),
            days,
        }
    }

    pub fn file_count(&self) -> usize {
        self.days
            .iter()
            .flat_map(|day| day.configurations.iter().flatten())
            .map(|configuration| configuration.files.as_ref().map_or(0, Vec::len))
            .sum()
    }
}

impl DaySnapshot {
    pub async fn capture(day: &Day) -> Self {
        let configurations = match day.loaded_entries().await {
            Some(entries) => {
                let mut configurations = Vec::new();
                for (_, configuration) in entries {
                    configurations.push(ConfigurationSnapshot::capture(&configuration).await);
                }
                Some(configurations)
            }
            None => None,
        };

        Self {
            date: day.date(),
            name: day.name().to_string(),
            address: day.address().to_string(),
            configurations,
        }
    }
}

impl ConfigurationSnapshot {
    pub async fn capture(configuration: &Configuration) -> Self {
        let files = configuration
            .loaded_entries()
            .await
            .map(|entries| entries.map(|(_, file)| File::clone(&file)).collect());

        Self {
            key: configuration.key(),
            configuration_type: configuration.configuration_type().to_string(),
            member: configuration.member(),
            address: configuration.address().to_string(),
            files,
        }
    }
}
