//! Geocode cache store error types.

use std::path::PathBuf;

/// Errors from the geocode cache store.
///
/// Opening a store that fails is fatal for the run; a failed write during a
/// batch is logged and the row keeps its resolution.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("cache store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but isn't a valid cache document
    #[error("cache store {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Entries could not be serialized
    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}
