//! Location code table error types.

use std::path::PathBuf;

/// Errors raised while loading the UN/LOCODE table.
///
/// All of these are fatal at startup: the resolver cannot run without its
/// reference table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The table file could not be opened or read
    #[error("failed to read location table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV structure itself is unreadable (bad header, bad encoding)
    #[error("malformed location table: {0}")]
    Csv(#[from] csv::Error),

    /// No usable rows were found
    #[error("location table {0} contains no usable entries")]
    Empty(String),
}
