//! Database schema definitions
//!
//! One `images` row per post ever seen. The unique index on `PostUrl` is the
//! conflict target of the upsert.

/// SQL schema for the download-state database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    PostUrl TEXT NOT NULL,
    ImageUrl TEXT,
    Filename TEXT,
    Domain TEXT,
    PostTitle TEXT,
    CommentSectionUrl TEXT,
    PostedOn TEXT,
    LastHtmlStatusCode INTEGER NOT NULL DEFAULT 0,
    Downloaded INTEGER NOT NULL DEFAULT 0,
    DownloadDate TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_images_post_url ON images(PostUrl);
CREATE INDEX IF NOT EXISTS idx_images_domain ON images(Domain);
"#;

/// Creates the tables and indexes if they do not exist yet
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
