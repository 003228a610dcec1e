//! Generators for synthetic NWM directory trees on disk.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use crate::fixtures::{configuration_dir, day_name, file_name};

/// A temporary directory laid out like an NWM mirror.
///
/// Files are empty; only their names matter. The directory is removed when dropped.
///
/// ```
/// use test_utils::{sample_date, NwmTree};
///
/// let tree = NwmTree::new()
///     .with_series(sample_date(), "short_range", "channel_rt", None, 6, 1..=3, "conus");
/// assert_eq!(tree.file_count(), 3);
/// ```
#[derive(Debug)]
pub struct NwmTree {
    dir: TempDir,
    files: usize,
}

impl NwmTree {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("nwm_tree_")
            .tempdir()
            .expect("Failed to create temporary NWM tree");
        Self { dir, files: 0 }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Root as a string address suitable for the local backend.
    pub fn address(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    /// Number of `.nc` files written so far.
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Path of a configuration directory, whether or not it exists yet.
    pub fn configuration_path(&self, date: NaiveDate, configuration_type: &str, member: Option<u64>) -> PathBuf {
        self.root()
            .join(day_name(date))
            .join(configuration_dir(configuration_type, member))
    }

    /// Create an empty day directory.
    pub fn with_day(self, date: NaiveDate) -> Self {
        std::fs::create_dir_all(self.root().join(day_name(date))).expect("Failed to create day directory");
        self
    }

    /// Create an empty configuration directory.
    pub fn with_configuration(self, date: NaiveDate, configuration_type: &str, member: Option<u64>) -> Self {
        std::fs::create_dir_all(self.configuration_path(date, configuration_type, member))
            .expect("Failed to create configuration directory");
        self
    }

    /// Write a file with an arbitrary name into a configuration directory.
    ///
    /// Names not ending in `.nc` are written but not counted.
    pub fn with_file(mut self, date: NaiveDate, configuration_type: &str, member: Option<u64>, name: &str) -> Self {
        let directory = self.configuration_path(date, configuration_type, member);
        std::fs::create_dir_all(&directory).expect("Failed to create configuration directory");
        std::fs::write(directory.join(name), b"").expect("Failed to write test file");

        if name.ends_with(".nc") {
            self.files += 1;
        }
        self
    }

    /// Write one file per step of a forecast run.
    #[allow(clippy::too_many_arguments)]
    pub fn with_series(
        mut self,
        date: NaiveDate,
        configuration_type: &str,
        model_type: &str,
        member: Option<u64>,
        reference: u32,
        steps: impl IntoIterator<Item = u64>,
        area: &str,
    ) -> Self {
        for step in steps {
            let name = file_name(reference, configuration_type, model_type, member, step, area);
            self = self.with_file(date, configuration_type, member, &name);
        }
        self
    }
}

impl Default for NwmTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_date;

    #[test]
    fn test_tree_layout() {
        let date = sample_date();
        let tree = NwmTree::new()
            .with_series(date, "medium_range", "land", Some(2), 0, [3, 6], "conus")
            .with_file(date, "short_range", None, "README")
            .with_day(NaiveDate::from_ymd_opt(2020, 8, 22).unwrap());

        assert_eq!(tree.file_count(), 2);
        assert!(tree
            .configuration_path(date, "medium_range", Some(2))
            .join("nwm.t00z.medium_range.land_2.f006.conus.nc")
            .exists());
        assert!(tree.root().join("nwm.20200822").is_dir());
        assert!(tree.root().join("nwm.20200821/short_range/README").exists());
    }
}
