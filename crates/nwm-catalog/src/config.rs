//! Explorer configuration.
//!
//! Loaded from a YAML file; every field has a default so an empty file is valid:
//!
//! ```yaml
//! explorer: remote
//! address: https://nomads.ncep.noaa.gov/pub/data/nccf/com/nwm/prod/
//! max_concurrent: 8
//! fail_fast: false
//! depth: files
//! remote:
//!   request_timeout_secs: 60
//!   connect_timeout_secs: 15
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::discovery::{DiscoveryDepth, DiscoveryOptions};
use crate::error::{CatalogError, CatalogResult};
use crate::explorer::ExplorerKind;
use crate::loader::RemoteSettings;

/// Public NOMADS root for operational NWM output.
pub const DEFAULT_NOMADS_ADDRESS: &str = "https://nomads.ncep.noaa.gov/pub/data/nccf/com/nwm/prod/";

/// Settings for building an [`Explorer`](crate::Explorer) and discovering its catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
    /// Backend name, `local` or `remote`
    #[serde(default = "default_explorer")]
    pub explorer: String,
    /// Root address; required for `local`, defaults to NOMADS for `remote`
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default)]
    pub depth: DiscoveryDepth,
    #[serde(default)]
    pub remote: RemoteSettings,
}

fn default_explorer() -> String {
    "remote".to_string()
}

fn default_max_concurrent() -> usize {
    8
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            explorer: default_explorer(),
            address: None,
            max_concurrent: default_max_concurrent(),
            fail_fast: false,
            depth: DiscoveryDepth::default(),
            remote: RemoteSettings::default(),
        }
    }
}

impl ExplorerConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: ExplorerConfig = serde_yaml::from_str(&content).map_err(|e| {
            CatalogError::InvalidConfig(format!("failed to parse {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), explorer = %config.explorer, "Loaded explorer config");
        Ok(config)
    }

    /// The backend this configuration selects.
    pub fn kind(&self) -> CatalogResult<ExplorerKind> {
        self.explorer.parse()
    }

    /// The root address to explore, falling back to NOMADS for the remote backend.
    pub fn resolved_address(&self) -> CatalogResult<String> {
        match (self.kind()?, self.address.as_deref().filter(|a| !a.trim().is_empty())) {
            (_, Some(address)) => Ok(address.to_string()),
            (ExplorerKind::Remote, None) => Ok(DEFAULT_NOMADS_ADDRESS.to_string()),
            (ExplorerKind::Local, None) => Err(CatalogError::MissingAddress),
        }
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            max_concurrent: self.max_concurrent,
            fail_fast: self.fail_fast,
            depth: self.depth,
        }
    }
}
