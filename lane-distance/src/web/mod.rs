//! Web layer for the lane distance service.
//!
//! JSON endpoints for batch lane enrichment, single-place resolution and
//! code-to-code distances.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
