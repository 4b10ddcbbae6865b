//! JSON file-backed geocode cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::error::StoreError;
use super::{CacheEntry, CacheKey, GeocodeStore};

/// On-disk format version.
const FORMAT_VERSION: u32 = 1;

/// Cache document as read from disk.
#[derive(Debug, Deserialize)]
struct CacheDocument {
    version: u32,
    entries: HashMap<CacheKey, CacheEntry>,
}

/// Cache document as written, borrowing the live entries.
#[derive(Debug, Serialize)]
struct CacheDocumentRef<'a> {
    version: u32,
    entries: &'a HashMap<CacheKey, CacheEntry>,
}

/// Geocode cache persisted to a single JSON file.
///
/// Entries are held in memory behind a read-write lock. Every `put` rewrites
/// the file through a temporary file and a rename, so a crash mid-write
/// leaves the previous document intact. The entry lock is held only while
/// serializing; file writes are ordered by a separate mutex so readers never
/// wait on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    writes: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries.
    ///
    /// A missing file starts an empty cache; parent directories are created.
    /// A file that exists but can't be parsed is an error rather than being
    /// silently discarded.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let doc: CacheDocument =
                    serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                if doc.version != FORMAT_VERSION {
                    return Err(StoreError::Corrupt {
                        path,
                        message: format!("unsupported format version {}", doc.version),
                    });
                }
                doc.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened geocode cache");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            writes: Mutex::new(()),
        })
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn serialize(entries: &HashMap<CacheKey, CacheEntry>) -> Result<String, StoreError> {
        let doc = CacheDocumentRef {
            version: FORMAT_VERSION,
            entries,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Replace the file with `json`. Callers hold `writes`.
    async fn write_document(&self, json: String) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        Ok(())
    }
}

impl GeocodeStore for FileStore {
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let guard = self.entries.read().await;
        guard.get(key).cloned()
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), StoreError> {
        // Taken before the snapshot, so the last write on disk is the newest.
        let _writing = self.writes.lock().await;
        let json = {
            let mut guard = self.entries.write().await;
            guard.insert(key, entry);
            Self::serialize(&guard)?
        };
        self.write_document(json).await
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let _writing = self.writes.lock().await;
        let json = Self::serialize(&*self.entries.read().await)?;
        self.write_document(json).await
    }
}
