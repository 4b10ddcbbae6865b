//! Resolution error types.

/// Why a place could not be resolved to coordinates.
///
/// These are row-level failures: the batch records them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Neither the code table nor the geocoder produced a match
    #[error("no match found for '{0}'")]
    NotFound(String),

    /// The geocoder could not be reached after retrying
    #[error("geocoding service unavailable for '{query}' after {attempts} attempt(s): {message}")]
    ServiceUnavailable {
        query: String,
        attempts: usize,
        message: String,
    },

    /// Nothing to resolve: blank name and no usable code
    #[error("empty location")]
    EmptyQuery,
}
