//! Listing-Harvester: a resumable media harvester for paginated post listings
//!
//! This crate crawls the listing pages of a content-aggregation site, extracts
//! per-post metadata, resolves each post's downloadable media (following the
//! link to a hosting site when needed) and keeps a SQLite record of what has
//! been discovered and downloaded, so repeated runs never fetch a file twice.

pub mod config;
pub mod crawler;
pub mod download;
pub mod media;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Listing-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transfer of {url} failed with HTTP {status}")]
    TransferStatus { url: String, status: u16 },

    #[error("No resolver registered for the hosting domain of {url}")]
    UnknownHostingDomain { url: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Listing-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{PageCrawler, PostExtractor};
pub use download::{DownloadOrchestrator, DownloadSummary};
pub use media::{FilenameDeriver, ResolverRegistry, UnknownDomainPolicy};
pub use state::{CrawlPhase, CrawlState, MediaReference, PostRecord};
pub use storage::{DownloadStore, SqliteStorage};
