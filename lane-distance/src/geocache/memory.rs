//! In-memory geocode cache.

use moka::future::Cache as MokaCache;

use super::error::StoreError;
use super::{CacheEntry, CacheKey, GeocodeStore};

/// Default maximum number of entries.
const DEFAULT_CAPACITY: u64 = 100_000;

/// Geocode cache that lives only as long as the process.
///
/// Used in tests and for one-off runs where nothing should touch disk.
#[derive(Clone)]
pub struct MemoryStore {
    entries: MokaCache<CacheKey, CacheEntry>,
}

impl MemoryStore {
    /// Create a store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a store holding at most `max_capacity` entries.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            entries: MokaCache::builder().max_capacity(max_capacity).build(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).await
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), StoreError> {
        self.entries.insert(key, entry).await;
        Ok(())
    }

    async fn len(&self) -> usize {
        // Entry counts are maintained lazily by moka.
        self.entries.run_pending_tasks().await;
        self.entries.entry_count() as usize
    }

    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
