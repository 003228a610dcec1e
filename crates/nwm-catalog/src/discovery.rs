//! Eager, bounded-concurrency population of a whole catalog.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::tree::{Catalog, Configuration, Day};

/// How far down the tree [`Catalog::load_all`] goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryDepth {
    Days,
    Configurations,
    #[default]
    Files,
}

impl FromStr for DiscoveryDepth {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "days" => Ok(DiscoveryDepth::Days),
            "configurations" => Ok(DiscoveryDepth::Configurations),
            "files" => Ok(DiscoveryDepth::Files),
            other => Err(CatalogError::InvalidConfig(format!(
                "unknown discovery depth '{}'; expected days, configurations or files",
                other
            ))),
        }
    }
}

impl fmt::Display for DiscoveryDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscoveryDepth::Days => "days",
            DiscoveryDepth::Configurations => "configurations",
            DiscoveryDepth::Files => "files",
        };
        write!(f, "{}", name)
    }
}

/// Options for [`Catalog::load_all`].
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Maximum number of containers enumerated at the same time
    pub max_concurrent: usize,
    /// Abort on the first failed subtree instead of recording it and moving on
    pub fail_fast: bool,
    pub depth: DiscoveryDepth,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 8,
            fail_fast: false,
            depth: DiscoveryDepth::Files,
        }
    }
}

/// Outcome of a full discovery pass.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub days: usize,
    pub configurations: usize,
    pub files: usize,
    /// Subtrees that could not be enumerated; their siblings are still loaded
    pub failures: Vec<CatalogError>,
}

impl DiscoveryReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Record a failed subtree, or abort if the caller asked for all-or-nothing.
fn record_failure(report: &mut DiscoveryReport, fail_fast: bool, error: CatalogError) -> CatalogResult<()> {
    if fail_fast {
        return Err(error);
    }
    report.failures.push(error);
    Ok(())
}

impl Catalog {
    /// Enumerate the catalog down to `options.depth`.
    ///
    /// Days and configurations are enumerated concurrently, at most `max_concurrent` at a
    /// time. Failing to list the root is always an error. A day or configuration that fails
    /// is recorded in the report and left unloaded, unless `fail_fast` is set.
    #[instrument(skip(self, options), fields(address = %self.address(), depth = %options.depth))]
    pub async fn load_all(&self, options: &DiscoveryOptions) -> CatalogResult<DiscoveryReport> {
        let concurrency = options.max_concurrent.max(1);
        let days: Vec<Arc<Day>> = self.entries().await?.map(|(_, day)| day).collect();

        let mut report = DiscoveryReport {
            days: days.len(),
            ..Default::default()
        };
        info!(days = report.days, "Discovered forecast days");

        if options.depth == DiscoveryDepth::Days {
            return Ok(report);
        }

        let mut configurations: Vec<Arc<Configuration>> = Vec::new();
        let mut listed = stream::iter(days)
            .map(|day| async move {
                let result = day.entries().await;
                (day, result)
            })
            .buffer_unordered(concurrency);

        while let Some((day, result)) = listed.next().await {
            match result {
                Ok(entries) => configurations.extend(entries.map(|(_, configuration)| configuration)),
                Err(e) => {
                    warn!(day = %day.date_string(), error = %e, "Failed to list configurations");
                    record_failure(&mut report, options.fail_fast, e)?;
                }
            }
        }

        report.configurations = configurations.len();
        info!(configurations = report.configurations, "Discovered configurations");

        if options.depth == DiscoveryDepth::Configurations {
            return Ok(report);
        }

        let mut listed = stream::iter(configurations)
            .map(|configuration| async move {
                let result = configuration.len().await;
                (configuration, result)
            })
            .buffer_unordered(concurrency);

        while let Some((configuration, result)) = listed.next().await {
            match result {
                Ok(count) => report.files += count,
                Err(e) => {
                    warn!(
                        day = %configuration.day(),
                        configuration = %configuration.key(),
                        error = %e,
                        "Failed to list files"
                    );
                    record_failure(&mut report, options.fail_fast, e)?;
                }
            }
        }

        info!(
            files = report.files,
            failures = report.failures.len(),
            "Discovery complete"
        );
        Ok(report)
    }
}
