//! Geocoder client error types.

/// Errors from the fallback geocoding service.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid access token or forbidden
    #[error("unauthorized: check MAPBOX_TOKEN")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by geocoding service")]
    RateLimited,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Client is missing configuration (e.g. no access token)
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl GeocodeError {
    /// Whether retrying the same request later might succeed.
    ///
    /// Rate limiting, transport failures and server-side errors are
    /// transient; authentication, configuration and payload problems are not.
    pub fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            GeocodeError::RateLimited => true,
            GeocodeError::Api { status, .. } => *status >= 500,
            GeocodeError::Unauthorized
            | GeocodeError::Json { .. }
            | GeocodeError::NotConfigured(_) => false,
        }
    }
}
