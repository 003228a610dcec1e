//! Predicate-based sub-trees.
//!
//! Every selection builds a new, fully loaded tree and leaves the source untouched.
//! Children that survive are shared with the source rather than copied.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CatalogResult;
use crate::tree::{Catalog, Configuration, Day, File};

impl Configuration {
    /// A copy of this configuration holding only the files the predicate accepts.
    pub async fn select_files<P>(&self, predicate: P) -> CatalogResult<Configuration>
    where
        P: Fn(&File) -> bool + Sync,
    {
        self.select_files_with(&predicate).await
    }

    async fn select_files_with<P>(&self, predicate: &P) -> CatalogResult<Configuration>
    where
        P: Fn(&File) -> bool + Sync,
    {
        let files: HashMap<_, _> = self
            .entries()
            .await?
            .filter(|(_, file)| predicate(file))
            .collect();
        Ok(self.with_files(files))
    }
}

impl Day {
    /// A copy of this day whose configurations hold only the files the predicate accepts.
    ///
    /// Configurations left without files are dropped.
    pub async fn select_files<P>(&self, predicate: P) -> CatalogResult<Day>
    where
        P: Fn(&File) -> bool + Sync,
    {
        self.select_files_with(&predicate).await
    }

    async fn select_files_with<P>(&self, predicate: &P) -> CatalogResult<Day>
    where
        P: Fn(&File) -> bool + Sync,
    {
        let mut configurations = HashMap::new();

        for (key, configuration) in self.entries().await? {
            let selected = configuration.select_files_with(predicate).await?;
            if !selected.is_empty().await? {
                configurations.insert(key, Arc::new(selected));
            }
        }

        Ok(self.with_configurations(configurations))
    }

    /// A copy of this day holding only the configurations the predicate accepts.
    pub async fn select_configurations<P>(&self, predicate: P) -> CatalogResult<Day>
    where
        P: Fn(&Configuration) -> bool + Sync,
    {
        self.select_configurations_with(&predicate).await
    }

    async fn select_configurations_with<P>(&self, predicate: &P) -> CatalogResult<Day>
    where
        P: Fn(&Configuration) -> bool + Sync,
    {
        let configurations: HashMap<_, _> = self
            .entries()
            .await?
            .filter(|(_, configuration)| predicate(configuration))
            .collect();
        Ok(self.with_configurations(configurations))
    }
}

impl Catalog {
    /// A copy of this catalog holding only the files the predicate accepts.
    ///
    /// Configurations and days left empty are dropped.
    pub async fn select_files<P>(&self, predicate: P) -> CatalogResult<Catalog>
    where
        P: Fn(&File) -> bool + Sync,
    {
        let mut days = HashMap::new();

        for (date, day) in self.entries().await? {
            let selected = day.select_files_with(&predicate).await?;
            if !selected.is_empty().await? {
                days.insert(date, Arc::new(selected));
            }
        }

        Ok(self.with_days(days))
    }

    /// A copy of this catalog holding only the configurations the predicate accepts.
    ///
    /// Days left without configurations are dropped.
    pub async fn select_configurations<P>(&self, predicate: P) -> CatalogResult<Catalog>
    where
        P: Fn(&Configuration) -> bool + Sync,
    {
        let mut days = HashMap::new();

        for (date, day) in self.entries().await? {
            let selected = day.select_configurations_with(&predicate).await?;
            if !selected.is_empty().await? {
                days.insert(date, Arc::new(selected));
            }
        }

        Ok(self.with_days(days))
    }

    /// A copy of this catalog holding only the days the predicate accepts.
    pub async fn select_days<P>(&self, predicate: P) -> CatalogResult<Catalog>
    where
        P: Fn(&Day) -> bool + Sync,
    {
        let days: HashMap<_, _> = self
            .entries()
            .await?
            .filter(|(_, day)| predicate(day))
            .collect();
        Ok(self.with_days(days))
    }
}
