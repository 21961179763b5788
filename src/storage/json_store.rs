//! JSON document page store
//!
//! Each page becomes `<storage_key>.json` inside the store directory:
//!
//! ```json
//! {
//!   "metadata": { "url": "...", "final_url": "...", "depth": 1,
//!                 "fetched_at": "...", "title": "..." },
//!   "content": "visible text"
//! }
//! ```

use crate::storage::traits::{PageStore, StorageError, StorageResult};
use crate::storage::PageRecord;
use crate::url::storage_key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Serialize, Deserialize)]
struct StoredPage {
    metadata: PageMetadata,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PageMetadata {
    url: String,
    final_url: String,
    depth: u32,
    fetched_at: DateTime<Utc>,
    title: Option<String>,
}

impl From<&PageRecord> for StoredPage {
    fn from(record: &PageRecord) -> Self {
        Self {
            metadata: PageMetadata {
                url: record.url.clone(),
                final_url: record.final_url.clone(),
                depth: record.depth,
                fetched_at: record.fetched_at,
                title: record.title.clone(),
            },
            content: record.content.clone(),
        }
    }
}

impl From<StoredPage> for PageRecord {
    fn from(stored: StoredPage) -> Self {
        Self {
            url: stored.metadata.url,
            final_url: stored.metadata.final_url,
            depth: stored.metadata.depth,
            fetched_at: stored.metadata.fetched_at,
            title: stored.metadata.title,
            content: stored.content,
        }
    }
}

/// Page store writing one JSON document per URL
#[derive(Debug, Clone)]
pub struct JsonFilePageStore {
    dir: PathBuf,
}

impl JsonFilePageStore {
    /// Opens a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Returns the file a URL's record is written to
    pub fn path_for(&self, url: &str) -> StorageResult<PathBuf> {
        let parsed = Url::parse(url).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
        Ok(self.dir.join(format!("{}.json", storage_key(&parsed))))
    }
}

impl PageStore for JsonFilePageStore {
    fn save(&self, record: &PageRecord) -> StorageResult<()> {
        let path = self.path_for(&record.url)?;
        let json = serde_json::to_vec_pretty(&StoredPage::from(record))?;

        // Write beside the target and rename, so a reader never sees half a file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        tracing::trace!("Wrote {} to {}", record.url, path.display());
        Ok(())
    }

    fn load(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let path = self.path_for(url)?;
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let stored: StoredPage = serde_json::from_slice(&bytes)?;
        Ok(Some(stored.into()))
    }

    fn count(&self) -> StorageResult<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }
}
