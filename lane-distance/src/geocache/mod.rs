//! Persistent cache of geocoded locations.
//!
//! Maps a normalized `"CITY, CC"` key to the coordinates the fallback
//! geocoder returned for it, so repeated runs over overlapping lane lists
//! don't call the external service again. One entry per key; `put`
//! overwrites (last write wins).

mod error;
mod file;
mod key;
mod memory;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, InvalidCoordinates, ResolutionMethod};

pub use error::StoreError;
pub use file::FileStore;
pub use key::CacheKey;
pub use memory::MemoryStore;

/// A cached resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub latitude: f64,
    pub longitude: f64,
    /// How the entry was originally obtained.
    pub method: ResolutionMethod,
    #[serde(default)]
    pub ambiguous: bool,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(coordinates: Coordinates, method: ResolutionMethod, ambiguous: bool) -> Self {
        Self {
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
            method,
            ambiguous,
            cached_at: Utc::now(),
        }
    }

    /// Validated coordinates of this entry.
    pub fn coordinates(&self) -> Result<Coordinates, InvalidCoordinates> {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Key-value store for geocode results.
///
/// Implementations must allow concurrent reads; writes may be serialized.
pub trait GeocodeStore: Send + Sync {
    /// Look up an entry.
    fn get(&self, key: &CacheKey) -> impl Future<Output = Option<CacheEntry>> + Send;

    /// Insert or overwrite an entry.
    fn put(
        &self,
        key: CacheKey,
        entry: CacheEntry,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Number of stored entries.
    fn len(&self) -> impl Future<Output = usize> + Send;

    /// Persist any buffered state. Called when a run finishes.
    fn flush(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
