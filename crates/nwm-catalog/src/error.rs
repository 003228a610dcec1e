//! Error types for catalog discovery and queries.

use thiserror::Error;

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure to pull NWM attributes out of a file or directory name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("'{name}' has no {segment} segment at index {index}")]
    MissingSegment {
        name: String,
        segment: &'static str,
        index: usize,
    },

    #[error("'{name}' has a non-numeric {segment} segment: '{value}'")]
    NotNumeric {
        name: String,
        segment: &'static str,
        value: String,
    },

    #[error("'{name}' does not carry a YYYYMMDD date")]
    InvalidDate { name: String },
}

impl AttributeError {
    /// The name that could not be parsed.
    pub fn name(&self) -> &str {
        match self {
            AttributeError::MissingSegment { name, .. }
            | AttributeError::NotNumeric { name, .. }
            | AttributeError::InvalidDate { name } => name,
        }
    }
}

/// Why a backend could not enumerate an address.
#[derive(Debug, Error)]
pub enum DiscoveryFailure {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Primary error type for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    // === Naming Errors ===
    #[error("Failed to parse name: {0}")]
    Parse(#[from] AttributeError),

    // === Backend Errors ===
    #[error("Could not enumerate '{address}': {failure}")]
    Discovery {
        address: String,
        #[source]
        failure: DiscoveryFailure,
    },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    // === Insertion Errors ===
    #[error("Value cannot be set on {container}; the key is invalid: {message}")]
    InvalidKey {
        container: &'static str,
        message: String,
    },

    #[error("Value cannot be set on {container}; the value is invalid: {message}")]
    InvalidValue {
        container: &'static str,
        message: String,
    },

    #[error("Value cannot be set on {container}; the key is invalid ({key_message}) and the value is invalid ({value_message})")]
    InvalidEntry {
        container: &'static str,
        key_message: String,
        value_message: String,
    },

    // === Facade Errors ===
    #[error("'{0}' is not a valid explorer; only the following are supported: local, remote")]
    UnknownExplorer(String),

    #[error("An address must be supplied if looking for files locally")]
    MissingAddress,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CatalogError {
    pub(crate) fn discovery(address: impl Into<String>, failure: impl Into<DiscoveryFailure>) -> Self {
        CatalogError::Discovery {
            address: address.into(),
            failure: failure.into(),
        }
    }

    /// Build the insertion error matching whichever of the key and value checks failed.
    ///
    /// Returns `None` when both checks passed.
    pub(crate) fn for_entry(
        container: &'static str,
        key_problem: Option<String>,
        value_problem: Option<String>,
    ) -> Option<Self> {
        match (key_problem, value_problem) {
            (None, None) => None,
            (Some(message), None) => Some(CatalogError::InvalidKey { container, message }),
            (None, Some(message)) => Some(CatalogError::InvalidValue { container, message }),
            (Some(key_message), Some(value_message)) => Some(CatalogError::InvalidEntry {
                container,
                key_message,
                value_message,
            }),
        }
    }

    /// Whether the error came from a backend failing to enumerate an address.
    pub fn is_discovery(&self) -> bool {
        matches!(self, CatalogError::Discovery { .. })
    }

    /// The address that failed to enumerate, if this is a discovery error.
    pub fn address(&self) -> Option<&str> {
        match self {
            CatalogError::Discovery { address, .. } => Some(address),
            _ => None,
        }
    }

    /// The HTTP status behind a discovery failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Discovery {
                failure: DiscoveryFailure::Status(status),
                ..
            } => Some(*status),
            _ => None,
        }
    }
}
