//! Storage traits and error types
//!
//! This module defines the trait interface for download-state backends and
//! associated error types.

use crate::state::PostRecord;
use crate::storage::{DomainCount, StoredRow};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Row not found: {0}")]
    RowNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted record of every post/media pair ever seen
///
/// Rows are keyed by the post's source URL and never deleted. Only
/// `mark_downloaded` sets the downloaded flag.
pub trait DownloadStore {
    // ===== Records =====

    /// Inserts a record or updates the row with the same source URL
    ///
    /// Known media fields are kept when the new record has none, a zero
    /// status never overwrites a known one, and the downloaded flag and date
    /// are left untouched.
    ///
    /// # Returns
    ///
    /// The ID of the inserted or updated row
    fn upsert(&mut self, record: &PostRecord) -> StorageResult<i64>;

    /// Marks a row as downloaded at `when`
    fn mark_downloaded(&mut self, row_id: i64, when: DateTime<Utc>) -> StorageResult<()>;

    /// Returns true if the row for `source_url` exists and is downloaded
    fn is_downloaded(&self, source_url: &str) -> StorageResult<bool>;

    /// Stores the last HTTP status seen for a row's media
    fn record_fetch_status(&mut self, row_id: i64, status: u16) -> StorageResult<()>;

    /// Gets a row by ID
    fn get_row(&self, row_id: i64) -> StorageResult<StoredRow>;

    /// Gets the row for a source URL
    fn get_row_by_url(&self, source_url: &str) -> StorageResult<Option<StoredRow>>;

    // ===== Statistics =====

    /// Total number of rows
    fn count_rows(&self) -> StorageResult<u64>;

    /// Number of rows with a resolved media URL
    fn count_with_media(&self) -> StorageResult<u64>;

    /// Number of downloaded rows
    fn count_downloaded(&self) -> StorageResult<u64>;

    /// Per-hosting-domain counts, largest first
    fn domain_breakdown(&self) -> StorageResult<Vec<DomainCount>>;
}
