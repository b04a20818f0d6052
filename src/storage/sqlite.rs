//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the DownloadStore trait.

use crate::state::PostRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DownloadStore, StorageError, StorageResult};
use crate::storage::{DomainCount, StoredRow};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Name of the database file inside a destination directory
pub const DATABASE_FILENAME: &str = "db.sqlite";

const ROW_COLUMNS: &str = "id, PostUrl, ImageUrl, Filename, Domain, PostTitle, CommentSectionUrl, \
                           PostedOn, LastHtmlStatusCode, Downloaded, DownloadDate";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and ensures the schema
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Opens the store of a destination directory, creating both if needed
    ///
    /// The database lives at `<directory>/db.sqlite`.
    pub fn open_destination(directory: &Path) -> Result<Self, HarvestError> {
        std::fs::create_dir_all(directory)?;
        let path = directory.join(DATABASE_FILENAME);
        tracing::debug!("Opening download state at {}", path.display());
        Self::new(&path)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn row_to_stored(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        id: row.get(0)?,
        source_url: row.get(1)?,
        resolved_url: row.get(2)?,
        filename: row.get(3)?,
        hosting_domain: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        title: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        comments_url: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        posted_at: row.get(7)?,
        last_fetch_status: row.get::<_, i64>(8)?.clamp(0, u16::MAX as i64) as u16,
        downloaded: row.get::<_, i64>(9)? != 0,
        download_date: row.get(10)?,
    })
}

impl DownloadStore for SqliteStorage {
    // ===== Records =====

    fn upsert(&mut self, record: &PostRecord) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO images (PostUrl, ImageUrl, Filename, Domain, PostTitle,
                                 CommentSectionUrl, PostedOn, LastHtmlStatusCode,
                                 Downloaded, DownloadDate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, NULL)
             ON CONFLICT(PostUrl) DO UPDATE SET
                 ImageUrl = COALESCE(excluded.ImageUrl, ImageUrl),
                 Filename = COALESCE(excluded.Filename, Filename),
                 Domain = excluded.Domain,
                 PostTitle = excluded.PostTitle,
                 CommentSectionUrl = excluded.CommentSectionUrl,
                 PostedOn = COALESCE(excluded.PostedOn, PostedOn),
                 LastHtmlStatusCode = CASE
                     WHEN excluded.LastHtmlStatusCode <> 0 THEN excluded.LastHtmlStatusCode
                     ELSE LastHtmlStatusCode
                 END",
            params![
                record.source_url,
                record.media.resolved_url,
                record.media.filename,
                record.hosting_domain,
                record.title,
                record.comments_url,
                record.posted_at,
                record.last_fetch_status,
            ],
        )?;

        let id: i64 = tx.query_row(
            "SELECT id FROM images WHERE PostUrl = ?1",
            params![record.source_url],
            |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(id)
    }

    fn mark_downloaded(&mut self, row_id: i64, when: DateTime<Utc>) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE images SET Downloaded = 1, DownloadDate = ?2 WHERE id = ?1",
            params![row_id, when.to_rfc3339()],
        )?;

        if changed == 0 {
            return Err(StorageError::RowNotFound(row_id));
        }
        Ok(())
    }

    fn is_downloaded(&self, source_url: &str) -> StorageResult<bool> {
        let downloaded: Option<i64> = self
            .conn
            .query_row(
                "SELECT Downloaded FROM images WHERE PostUrl = ?1",
                params![source_url],
                |row| row.get(0),
            )
            .optional()?;

        Ok(downloaded.is_some_and(|flag| flag != 0))
    }

    fn record_fetch_status(&mut self, row_id: i64, status: u16) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE images SET LastHtmlStatusCode = ?2 WHERE id = ?1",
            params![row_id, status],
        )?;

        if changed == 0 {
            return Err(StorageError::RowNotFound(row_id));
        }
        Ok(())
    }

    fn get_row(&self, row_id: i64) -> StorageResult<StoredRow> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM images WHERE id = ?1", ROW_COLUMNS),
                params![row_id],
                row_to_stored,
            )
            .optional()?
            .ok_or(StorageError::RowNotFound(row_id))
    }

    fn get_row_by_url(&self, source_url: &str) -> StorageResult<Option<StoredRow>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM images WHERE PostUrl = ?1", ROW_COLUMNS),
                params![source_url],
                row_to_stored,
            )
            .optional()?;
        Ok(row)
    }

    // ===== Statistics =====

    fn count_rows(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_with_media(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM images WHERE ImageUrl IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_downloaded(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM images WHERE Downloaded = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn domain_breakdown(&self) -> StorageResult<Vec<DomainCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(Domain, ''),
                    COUNT(*),
                    SUM(CASE WHEN ImageUrl IS NOT NULL THEN 1 ELSE 0 END),
                    SUM(Downloaded)
             FROM images
             GROUP BY COALESCE(Domain, '')
             ORDER BY COUNT(*) DESC, COALESCE(Domain, '') ASC",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok(DomainCount {
                    domain: row.get(0)?,
                    rows: row.get::<_, i64>(1)? as u64,
                    with_media: row.get::<_, i64>(2)? as u64,
                    downloaded: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}
