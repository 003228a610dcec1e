//! HTTP backend scraping NOMADS-style HTML directory indexes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{
    parse_anchors, parse_configuration_name, parse_day_name, Anchor, CatalogLoader,
    ConfigurationListing, DayListing, FileListing, FILE_EXTENSION,
};
use crate::error::{CatalogError, CatalogResult, DiscoveryFailure};

/// Text of the link back to the enclosing directory in Apache indexes.
const PARENT_DIRECTORY: &str = "Parent Directory";

/// HTTP settings for the remote backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSettings {
    /// Total timeout for a single listing request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Timeout for establishing a connection
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("nwm-catalog/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Lists NWM days, configurations, and files from an HTTP directory index.
#[derive(Debug, Clone)]
pub struct RemoteLoader {
    client: Client,
}

impl RemoteLoader {
    /// Create a remote loader with the given HTTP settings.
    pub fn new(settings: &RemoteSettings) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(settings.user_agent.clone())
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Fetch a listing page and pull out its anchors.
    async fn fetch_anchors(&self, address: &str) -> CatalogResult<Vec<Anchor>> {
        let response = self
            .client
            .get(address)
            .send()
            .await
            .map_err(|e| CatalogError::discovery(address, e))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(CatalogError::discovery(
                address,
                DiscoveryFailure::Status(status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::discovery(address, e))?;

        Ok(parse_anchors(&body))
    }
}

/// Resolve a listing link against the page that contained it.
pub(crate) fn join_address(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, href)
    } else {
        format!("{}/{}", base, href)
    }
}

/// Sorting and parent links (`?C=N;O=D`, `/pub/...`) are not part of the listing.
fn is_navigation(anchor: &Anchor) -> bool {
    anchor.text == PARENT_DIRECTORY || anchor.href.starts_with('?') || anchor.href.starts_with('/')
}

pub(crate) fn days_from_anchors(root: &str, anchors: &[Anchor]) -> Vec<DayListing> {
    anchors
        .iter()
        .filter_map(|anchor| match parse_day_name(&anchor.text)? {
            Ok((date, name)) => Some(DayListing {
                date,
                name,
                address: join_address(root, &anchor.href),
            }),
            Err(e) => {
                warn!(error = %e, "Skipping day link");
                None
            }
        })
        .collect()
}

pub(crate) fn configurations_from_anchors(day_address: &str, anchors: &[Anchor]) -> Vec<ConfigurationListing> {
    anchors
        .iter()
        .filter(|anchor| !is_navigation(anchor))
        .map(|anchor| {
            let (configuration_type, member) = parse_configuration_name(&anchor.text);
            ConfigurationListing {
                configuration_type,
                address: join_address(day_address, &anchor.href),
                member,
            }
        })
        .collect()
}

pub(crate) fn files_from_anchors(configuration_address: &str, anchors: &[Anchor]) -> Vec<FileListing> {
    anchors
        .iter()
        .filter(|anchor| anchor.text.ends_with(FILE_EXTENSION))
        .map(|anchor| FileListing {
            name: anchor.text.clone(),
            address: join_address(configuration_address, &anchor.href),
        })
        .collect()
}

#[async_trait]
impl CatalogLoader for RemoteLoader {
    fn name(&self) -> &'static str {
        "remote"
    }

    #[instrument(skip(self))]
    async fn list_days(&self, root: &str) -> CatalogResult<Vec<DayListing>> {
        debug!("Getting information about the latest forecasts for a new catalog");
        let anchors = self.fetch_anchors(root).await?;
        let days = days_from_anchors(root, &anchors);
        debug!(count = days.len(), "Listed remote forecast days");
        Ok(days)
    }

    #[instrument(skip(self))]
    async fn list_configurations(&self, day_address: &str) -> CatalogResult<Vec<ConfigurationListing>> {
        let anchors = self.fetch_anchors(day_address).await?;
        let configurations = configurations_from_anchors(day_address, &anchors);
        debug!(count = configurations.len(), "Listed remote configurations");
        Ok(configurations)
    }

    #[instrument(skip(self))]
    async fn list_files(&self, configuration_address: &str) -> CatalogResult<Vec<FileListing>> {
        let anchors = self.fetch_anchors(configuration_address).await?;
        let files = files_from_anchors(configuration_address, &anchors);
        debug!(count = files.len(), "Listed remote files");
        Ok(files)
    }
}
