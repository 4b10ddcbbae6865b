//! Batch processing configuration.

/// Default number of rows resolved concurrently.
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Configuration for [`super::BatchProcessor`].
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Rows resolved concurrently per chunk; 0 is treated as 1.
    pub batch_size: usize,
}

impl BatchConfig {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}
