//! Entry point that picks a backend by name and discovers the catalog behind an address.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::config::{ExplorerConfig, DEFAULT_NOMADS_ADDRESS};
use crate::error::{CatalogError, CatalogResult};
use crate::loader::{CatalogLoader, LocalLoader, RemoteLoader, RemoteSettings};
use crate::tree::Catalog;

/// Supported enumeration backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerKind {
    Local,
    Remote,
}

impl FromStr for ExplorerKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(ExplorerKind::Local),
            "remote" => Ok(ExplorerKind::Remote),
            other => Err(CatalogError::UnknownExplorer(other.to_string())),
        }
    }
}

impl fmt::Display for ExplorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorerKind::Local => write!(f, "local"),
            ExplorerKind::Remote => write!(f, "remote"),
        }
    }
}

/// Provides access to a NOMADS-like National Water Model data repository.
///
/// The backend and address are validated up front; nothing is enumerated until
/// [`explore`](Explorer::explore) is called.
#[derive(Debug)]
pub struct Explorer {
    address: String,
    loader: Arc<dyn CatalogLoader>,
    catalog: OnceCell<Arc<Catalog>>,
}

impl Explorer {
    /// Create an explorer for `explorer` (`local` or `remote`) rooted at `address`.
    ///
    /// The local backend needs an address; the remote one falls back to NOMADS.
    pub fn new(address: Option<&str>, explorer: &str) -> CatalogResult<Self> {
        let config = ExplorerConfig {
            explorer: explorer.to_string(),
            address: address.map(str::to_string),
            ..Default::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &ExplorerConfig) -> CatalogResult<Self> {
        let address = config.resolved_address()?;
        let loader: Arc<dyn CatalogLoader> = match config.kind()? {
            ExplorerKind::Local => Arc::new(LocalLoader::new()),
            ExplorerKind::Remote => Arc::new(RemoteLoader::new(&config.remote)?),
        };

        Ok(Self::with_loader(address, loader))
    }

    /// Explore a remote listing with custom HTTP settings.
    pub fn remote(address: Option<&str>, settings: &RemoteSettings) -> CatalogResult<Self> {
        let address = address.unwrap_or(DEFAULT_NOMADS_ADDRESS);
        Ok(Self::with_loader(address, Arc::new(RemoteLoader::new(settings)?)))
    }

    /// Explore through any backend.
    pub fn with_loader(address: impl Into<String>, loader: Arc<dyn CatalogLoader>) -> Self {
        Self {
            address: address.into(),
            loader,
            catalog: OnceCell::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Name of the backend in use.
    pub fn backend(&self) -> &'static str {
        self.loader.name()
    }

    /// Discover the days under the root address and return the catalog.
    ///
    /// Later calls return the same catalog without contacting the backend again.
    pub async fn explore(&self) -> CatalogResult<Arc<Catalog>> {
        let catalog = self
            .catalog
            .get_or_try_init(|| async {
                let catalog = Catalog::new(self.address.clone(), Arc::clone(&self.loader));
                catalog.load().await?;
                info!(address = %self.address, backend = self.loader.name(), "Explored catalog");
                Ok::<_, CatalogError>(Arc::new(catalog))
            })
            .await?;

        Ok(Arc::clone(catalog))
    }

    /// The catalog, if [`explore`](Explorer::explore) has succeeded.
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.catalog.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_explorer() {
        let err = Explorer::new(Some("/data"), "ftp").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownExplorer(ref name) if name == "ftp"));
        assert!(err.to_string().contains("local, remote"));
    }

    #[test]
    fn test_local_requires_address() {
        assert!(matches!(Explorer::new(None, "local"), Err(CatalogError::MissingAddress)));
        assert!(matches!(Explorer::new(Some(""), "local"), Err(CatalogError::MissingAddress)));
    }

    #[test]
    fn test_remote_defaults_to_nomads() {
        let explorer = Explorer::new(None, "remote").unwrap();
        assert_eq!(explorer.address(), DEFAULT_NOMADS_ADDRESS);
        assert_eq!(explorer.backend(), "remote");
        assert!(explorer.catalog().is_none());
    }

    #[tokio::test]
    async fn test_explore_local_tree() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("nwm.20200821").join("short_range")).unwrap();
        std::fs::create_dir_all(root.path().join("nwm.20200822")).unwrap();

        let address = root.path().to_string_lossy().into_owned();
        let explorer = Explorer::new(Some(address.as_str()), "local").unwrap();
        assert!(!explorer.is_loaded());

        let catalog = explorer.explore().await.unwrap();
        assert!(catalog.is_loaded());
        assert_eq!(catalog.len().await.unwrap(), 2);
        assert!(Arc::ptr_eq(&catalog, &explorer.explore().await.unwrap()));
    }

    #[tokio::test]
    async fn test_explore_missing_root_fails() {
        let explorer = Explorer::new(Some("/nonexistent/nwm"), "local").unwrap();
        let err = explorer.explore().await.unwrap_err();
        assert!(err.is_discovery());
        assert!(!explorer.is_loaded());
    }
}
