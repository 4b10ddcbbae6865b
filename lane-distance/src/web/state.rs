//! Application state for the web layer.

use std::sync::Arc;

use crate::batch::BatchProcessor;
use crate::resolver::Resolver;

/// Shared application state.
pub struct AppState<G, S> {
    /// Batch processor, which also owns the resolver
    pub processor: Arc<BatchProcessor<G, S>>,
}

impl<G, S> AppState<G, S> {
    pub fn new(processor: BatchProcessor<G, S>) -> Self {
        Self {
            processor: Arc::new(processor),
        }
    }

    pub fn resolver(&self) -> &Resolver<G, S> {
        self.processor.resolver()
    }
}

// Derived Clone would require G: Clone and S: Clone.
impl<G, S> Clone for AppState<G, S> {
    fn clone(&self) -> Self {
        Self {
            processor: Arc::clone(&self.processor),
        }
    }
}
