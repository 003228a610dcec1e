//! Counting files that match a set of optional equality filters.

use chrono::NaiveDate;

use crate::error::CatalogResult;
use crate::tree::{Catalog, Configuration, Day, File};

/// Optional equality filters over files. Unset filters are ignored and set filters are ANDed.
///
/// ```
/// use nwm_catalog::FileFilter;
///
/// let filter = FileFilter::new().with_model_type("channel_rt").with_reference(6);
/// assert_eq!(filter.reference, Some(6));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    pub name: Option<String>,
    pub reference: Option<u64>,
    pub configuration_type: Option<String>,
    pub model_type: Option<String>,
    pub step: Option<u64>,
    pub area: Option<String>,
    pub member: Option<u64>,
    pub date: Option<NaiveDate>,
}

impl FileFilter {
    /// A filter that admits every file.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_reference(mut self, reference: u32) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_configuration_type(mut self, configuration_type: impl Into<String>) -> Self {
        self.configuration_type = Some(configuration_type.into());
        self
    }

    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
        self
    }

    pub fn with_step(mut self, step: u64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn with_member(mut self, member: u64) -> Self {
        self.member = Some(member);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    fn admits_date(&self, date: NaiveDate) -> bool {
        self.date.map_or(true, |wanted| wanted == date)
    }

    /// Whether files of this configuration can match at all, judged without loading them.
    fn admits_configuration(&self, configuration: &Configuration) -> bool {
        self.admits_date(configuration.date())
            && self
                .configuration_type
                .as_deref()
                .map_or(true, |wanted| wanted == configuration.configuration_type())
            && self.member.map_or(true, |wanted| configuration.member() == Some(wanted))
    }

    /// Whether the file-level filters hold for a file.
    pub fn matches(&self, file: &File) -> bool {
        self.name.as_deref().map_or(true, |wanted| wanted == file.name)
            && self.reference.map_or(true, |wanted| wanted == u64::from(file.reference))
            && self.model_type.as_deref().map_or(true, |wanted| wanted == file.model_type)
            && self.step.map_or(true, |wanted| file.step == Some(wanted))
            && self.area.as_deref().map_or(true, |wanted| wanted == file.area)
            && self.member.map_or(true, |wanted| file.member == Some(wanted))
    }
}

impl Configuration {
    /// Number of files in this configuration passing the filter.
    pub async fn file_count(&self, filter: &FileFilter) -> CatalogResult<usize> {
        if !filter.admits_configuration(self) {
            return Ok(0);
        }

        Ok(self
            .entries()
            .await?
            .filter(|(_, file)| filter.matches(file))
            .count())
    }
}

impl Day {
    /// Number of files across this day's configurations passing the filter.
    pub async fn file_count(&self, filter: &FileFilter) -> CatalogResult<usize> {
        if !filter.admits_date(self.date()) {
            return Ok(0);
        }

        let mut count = 0;
        for (_, configuration) in self.entries().await? {
            count += configuration.file_count(filter).await?;
        }
        Ok(count)
    }
}

impl Catalog {
    /// Number of files across the whole catalog passing the filter.
    ///
    /// When the filter names a date only that day is enumerated.
    pub async fn file_count(&self, filter: &FileFilter) -> CatalogResult<usize> {
        if let Some(date) = filter.date {
            return match self.get(date).await? {
                Some(day) => day.file_count(filter).await,
                None => Ok(0),
            };
        }

        let mut count = 0;
        for (_, day) in self.entries().await? {
            count += day.file_count(filter).await?;
        }
        Ok(count)
    }
}
