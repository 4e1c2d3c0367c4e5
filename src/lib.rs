//! Site-Mirror: a same-host website mirrorer
//!
//! This crate fetches every same-host resource reachable from a seed URL,
//! rewrites HTML and CSS references so the result can be browsed straight
//! from disk, and stores each resource under a deterministic local path.

pub mod config;
pub mod crawler;
pub mod output;
pub mod rewrite;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid task transition: {from} -> {to}")]
    InvalidTransition {
        from: state::TaskState,
        to: state::TaskState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
///
/// None of these abort a run: a reference that fails to resolve is skipped.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Reference is not fetchable: {0}")]
    NotFetchable(String),
}

/// Transport failures and non-2xx responses for a single resource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result type alias for Site-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::MirrorConfig;
pub use crawler::{mirror, Mirror, MirrorReport};
pub use state::{TaskOutcome, TaskState};
pub use crate::url::{relative_reference, resolve, to_local_path, HostScope};
