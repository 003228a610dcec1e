//! Grouping a configuration's files into forecast time series.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::CatalogResult;
use crate::tree::{Catalog, Configuration, Day, DayId, File};

/// All files making up one forecast run of one model type, ordered by step.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    files: Vec<Arc<File>>,
    reference: u32,
    configuration_type: String,
    model_type: String,
    area: String,
    member: Option<u64>,
    day: DayId,
}

impl TimeSeries {
    /// Build a series from a non-empty group of files sharing model type and reference.
    fn from_partition(
        mut files: Vec<Arc<File>>,
        reference: u32,
        model_type: String,
        configuration: &Configuration,
    ) -> Self {
        sort_by_step(&mut files);
        let area = files.first().map(|file| file.area.clone()).unwrap_or_default();

        Self {
            files,
            reference,
            configuration_type: configuration.configuration_type().to_string(),
            model_type,
            area,
            member: configuration.member(),
            day: configuration.day().clone(),
        }
    }

    pub fn files(&self) -> &[Arc<File>] {
        &self.files
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<File>> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Hour of the day (zulu) when the forecast begins.
    pub fn reference(&self) -> u32 {
        self.reference
    }

    pub fn configuration_type(&self) -> &str {
        &self.configuration_type
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    /// Area of the earliest step in the series.
    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn member(&self) -> Option<u64> {
        self.member
    }

    /// The day the forecast began on.
    pub fn day(&self) -> &DayId {
        &self.day
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Arc<File>;
    type IntoIter = std::slice::Iter<'a, Arc<File>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} over {} at t{:02}Z on {}",
            self.configuration_type,
            self.model_type,
            self.area,
            self.reference,
            self.day.date_string()
        )?;

        if let Some(member) = self.member {
            write!(f, ", ensemble member {}", member)?;
        }

        write!(f, " (Steps = {})", self.files.len())
    }
}

/// Stable sort, ascending by step. Files without a step come first.
fn sort_by_step(files: &mut [Arc<File>]) {
    files.sort_by_key(|file| file.step);
}

impl Configuration {
    /// Files of one model type and reference hour, ordered by step.
    pub async fn time_series(&self, model_type: &str, reference: u32) -> CatalogResult<Vec<Arc<File>>> {
        let mut files: Vec<_> = self
            .all_files()
            .await?
            .into_iter()
            .filter(|file| file.model_type == model_type && file.reference == reference)
            .collect();
        sort_by_step(&mut files);
        Ok(files)
    }

    /// One time series per distinct `(model_type, reference)` pair among the files.
    pub async fn all_time_series(&self) -> CatalogResult<Vec<TimeSeries>> {
        let mut partitions: BTreeMap<(String, u32), Vec<Arc<File>>> = BTreeMap::new();

        for file in self.all_files().await? {
            partitions
                .entry((file.model_type.clone(), file.reference))
                .or_default()
                .push(file);
        }

        Ok(partitions
            .into_iter()
            .map(|((model_type, reference), files)| {
                TimeSeries::from_partition(files, reference, model_type, self)
            })
            .collect())
    }
}

impl Day {
    /// Files of one model type and reference hour within the configuration stored under
    /// `configuration_key`. Empty if there is no such configuration.
    pub async fn time_series(
        &self,
        configuration_key: &str,
        model_type: &str,
        reference: u32,
    ) -> CatalogResult<Vec<Arc<File>>> {
        match self.get(configuration_key).await? {
            Some(configuration) => configuration.time_series(model_type, reference).await,
            None => Ok(Vec::new()),
        }
    }
}

impl Catalog {
    /// Files of one model type and reference hour for a configuration on a given date.
    pub async fn time_series(
        &self,
        date: NaiveDate,
        configuration_key: &str,
        model_type: &str,
        reference: u32,
    ) -> CatalogResult<Vec<Arc<File>>> {
        match self.get(date).await? {
            Some(day) => day.time_series(configuration_key, model_type, reference).await,
            None => Ok(Vec::new()),
        }
    }

    /// Every time series of a configuration type across all days, matching the model type
    /// case-insensitively.
    ///
    /// Ensemble members of the configuration each contribute their own series. Days without
    /// the configuration are skipped.
    pub async fn all_time_series(&self, configuration_type: &str, model_type: &str) -> CatalogResult<Vec<TimeSeries>> {
        let mut series = Vec::new();

        for (_, day) in self.entries().await? {
            for configuration in day.configurations_of_type(configuration_type).await? {
                series.extend(
                    configuration
                        .all_time_series()
                        .await?
                        .into_iter()
                        .filter(|s| s.model_type.eq_ignore_ascii_case(model_type)),
                );
            }
        }

        Ok(series)
    }
}
