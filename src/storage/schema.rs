//! Database schema definitions
//!
//! This module contains the SQL schema for the SQLite page store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawled page, keyed by the storage key of its canonical URL
CREATE TABLE IF NOT EXISTS pages (
    url_key TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    final_url TEXT NOT NULL,
    depth INTEGER NOT NULL,
    fetched_at TEXT NOT NULL,
    title TEXT,
    content TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_url ON pages(url);
CREATE INDEX IF NOT EXISTS idx_pages_depth ON pages(depth);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
