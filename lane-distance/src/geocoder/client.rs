//! Mapbox forward-geocoding HTTP client.
//!
//! Queries the Mapbox Geocoding API (v5, `mapbox.places`) for city-level
//! matches. Every request passes through the shared [`RateLimiter`].

use std::sync::Arc;

use reqwest::Url;
use tracing::debug;

use super::error::GeocodeError;
use super::limiter::RateLimiter;
use super::types::GeocodeResponse;
use super::{Candidate, GeocodeQuery, Geocoder, dedupe_candidates};
use crate::domain::Coordinates;

/// Default base URL for the Mapbox API.
const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Default number of candidates to request.
const DEFAULT_LIMIT: u8 = 5;

/// Feature types that represent a city.
const PLACE_TYPES: &str = "place,locality";

/// Configuration for the Mapbox client.
#[derive(Debug, Clone)]
pub struct MapboxConfig {
    /// Access token; requests fail with `NotConfigured` without one
    pub access_token: Option<String>,
    /// Base URL for the API
    pub base_url: String,
    /// Maximum candidates per query (Mapbox caps this at 10)
    pub limit: u8,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MapboxConfig {
    /// Create a new config with the given access token.
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            limit: DEFAULT_LIMIT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the maximum number of candidates per query.
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit.clamp(1, 10);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Mapbox geocoding client.
#[derive(Debug, Clone)]
pub struct MapboxClient {
    http: reqwest::Client,
    config: MapboxConfig,
    limiter: Arc<RateLimiter>,
}

impl MapboxClient {
    /// Create a new client sharing the given rate limiter.
    pub fn new(config: MapboxConfig, limiter: Arc<RateLimiter>) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    /// Whether an access token is configured.
    pub fn is_configured(&self) -> bool {
        self.config.access_token.is_some()
    }

    /// Build the request URL for a query, without credentials.
    fn endpoint(&self, query: &GeocodeQuery) -> Result<Url, GeocodeError> {
        let invalid =
            || GeocodeError::NotConfigured(format!("invalid base URL: {}", self.config.base_url));

        let file = format!("{}.json", query.text);
        let mut url = Url::parse(&self.config.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places", file.as_str()]);

        {
            let mut params = url.query_pairs_mut();
            params
                .append_pair("limit", &self.config.limit.to_string())
                .append_pair("types", PLACE_TYPES);
            if let Some(country) = &query.country {
                params.append_pair("country", &country.to_lowercase());
            }
        }

        Ok(url)
    }

    async fn fetch(&self, query: &GeocodeQuery) -> Result<Vec<Candidate>, GeocodeError> {
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or_else(|| GeocodeError::NotConfigured("no Mapbox access token".to_string()))?;

        let url = self.endpoint(query)?;

        self.limiter.acquire().await;
        debug!(query = %query.text, country = ?query.country, "Geocoding request");

        let response = self
            .http
            .get(url)
            .query(&[("access_token", token)])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GeocodeError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        Ok(candidates_from_response(parsed))
    }
}

impl Geocoder for MapboxClient {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Vec<Candidate>, GeocodeError> {
        self.fetch(query).await
    }
}

/// Convert a response into ranked, de-duplicated candidates.
///
/// Mapbox returns features best-first; that order is kept as-is.
fn candidates_from_response(response: GeocodeResponse) -> Vec<Candidate> {
    let candidates = response
        .features
        .into_iter()
        .filter_map(|f| {
            let (lat, lon) = f.lat_lon()?;
            let coordinates = Coordinates::new(lat, lon).ok()?;
            Some(Candidate {
                coordinates,
                confidence: f.relevance.unwrap_or(0.0),
                label: f.place_name,
            })
        })
        .collect();

    dedupe_candidates(candidates)
}
