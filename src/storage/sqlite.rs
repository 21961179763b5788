//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the [`PageStore`]
//! trait. The connection is guarded by a mutex so one store can be shared
//! across crawl tasks.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageStore, StorageError, StorageResult};
use crate::storage::PageRecord;
use crate::url::storage_key;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use url::Url;

/// SQLite page store
pub struct SqlitePageStore {
    conn: Mutex<Connection>,
}

impl SqlitePageStore {
    /// Creates a new SqlitePageStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqlitePageStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn key_for(url: &str) -> StorageResult<String> {
    let parsed = Url::parse(url).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
    Ok(storage_key(&parsed))
}

impl PageStore for SqlitePageStore {
    fn save(&self, record: &PageRecord) -> StorageResult<()> {
        let key = key_for(&record.url)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO pages (url_key, url, final_url, depth, fetched_at, title, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(url_key) DO UPDATE SET
                final_url = excluded.final_url,
                depth = excluded.depth,
                fetched_at = excluded.fetched_at,
                title = excluded.title,
                content = excluded.content",
            params![
                key,
                record.url,
                record.final_url,
                record.depth,
                record.fetched_at.to_rfc3339(),
                record.title,
                record.content,
            ],
        )?;
        Ok(())
    }

    fn load(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let key = key_for(url)?;
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT url, final_url, depth, fetched_at, title, content
             FROM pages WHERE url_key = ?1",
        )?;

        let row = stmt
            .query_row(params![key], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .optional()?;

        let Some((url, final_url, depth, fetched_at, title, content)) = row else {
            return Ok(None);
        };

        let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
            .map_err(|e| StorageError::Corrupt {
                key: key.clone(),
                message: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(Some(PageRecord {
            url,
            final_url,
            depth,
            fetched_at,
            title,
            content,
        }))
    }

    fn count(&self) -> StorageResult<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
