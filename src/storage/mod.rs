//! Storage module for the download-state database
//!
//! This module handles all database operations of the harvester:
//! - SQLite database initialization and schema management
//! - Idempotent upserts of discovered posts
//! - Download bookkeeping (flag, date, last HTTP status)
//! - Aggregate counts for statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{SqliteStorage, DATABASE_FILENAME};
pub use traits::{DownloadStore, StorageError, StorageResult};

/// A row of the `images` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub id: i64,
    pub source_url: String,
    pub resolved_url: Option<String>,
    pub filename: Option<String>,
    pub hosting_domain: String,
    pub title: String,
    pub comments_url: String,
    pub posted_at: Option<String>,
    pub last_fetch_status: u16,
    pub downloaded: bool,
    pub download_date: Option<String>,
}

/// Row counts for one hosting domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCount {
    pub domain: String,
    pub rows: u64,
    pub with_media: u64,
    pub downloaded: u64,
}
