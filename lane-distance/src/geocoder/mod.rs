//! Fallback geocoding.
//!
//! Used only when a place has neither a known UN/LOCODE nor a cached
//! result. The production implementation talks to Mapbox; all requests go
//! through one process-wide [`RateLimiter`] so the upstream quota holds
//! however many rows are in flight.

mod client;
mod error;
mod fixed;
mod limiter;
mod types;

use std::collections::HashSet;
use std::future::Future;

use crate::domain::{Coordinates, clean_part, iso2};

pub use client::{MapboxClient, MapboxConfig};
pub use error::GeocodeError;
pub use fixed::FixedGeocoder;
pub use limiter::{DEFAULT_MIN_INTERVAL, RateLimiter};

/// A forward-geocoding request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeocodeQuery {
    /// Free-text place name, e.g. "Springfield".
    pub text: String,
    /// Optional ISO 3166 alpha-2 country filter. Country names and alpha-3
    /// codes are converted; other unrecognized input is dropped.
    pub country: Option<String>,
}

impl GeocodeQuery {
    pub fn new(text: impl Into<String>, country: Option<&str>) -> Self {
        let text: String = text.into();
        Self {
            text: clean_part(&text).to_string(),
            country: country.map(clean_part).and_then(|c| {
                iso2(c).or_else(|| {
                    (c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
                        .then(|| c.to_ascii_uppercase())
                })
            }),
        }
    }
}

/// A candidate match, in the order the service ranked it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub coordinates: Coordinates,
    /// Service-reported confidence; informational only, ranking is the
    /// order of the candidate list.
    pub confidence: f64,
    pub label: Option<String>,
}

impl Candidate {
    pub fn new(coordinates: Coordinates, confidence: f64) -> Self {
        Self {
            coordinates,
            confidence,
            label: None,
        }
    }
}

/// Forward geocoding capability.
///
/// Returns candidates best-first. An empty list means "no match"; errors
/// are reserved for failures talking to the service.
pub trait Geocoder: Send + Sync {
    fn geocode(
        &self,
        query: &GeocodeQuery,
    ) -> impl Future<Output = Result<Vec<Candidate>, GeocodeError>> + Send;
}

/// Drop candidates that sit on the same spot as an earlier one.
///
/// Points that agree to three decimal places (about 100 m) are the same
/// place reported twice, not a genuine alternative. Order is preserved.
pub fn dedupe_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| {
            let lat = (c.coordinates.latitude() * 1000.0).round() as i64;
            let lon = (c.coordinates.longitude() * 1000.0).round() as i64;
            seen.insert((lat, lon))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(lat: f64, lon: f64) -> Candidate {
        Candidate::new(Coordinates::new(lat, lon).unwrap(), 1.0)
    }

    #[test]
    fn query_normalizes_country() {
        let q = GeocodeQuery::new("  Paris ", Some(" fr "));
        assert_eq!(q.text, "Paris");
        assert_eq!(q.country.as_deref(), Some("FR"));
    }

    #[test]
    fn query_converts_country_names() {
        let q = GeocodeQuery::new("Paris.", Some("France"));
        assert_eq!(q.text, "Paris");
        assert_eq!(q.country.as_deref(), Some("FR"));
        assert_eq!(GeocodeQuery::new("Lyon", Some("US..")).country.as_deref(), Some("US"));
        assert_eq!(GeocodeQuery::new("Lyon", Some("deu")).country.as_deref(), Some("DE"));
    }

    #[test]
    fn query_ignores_unknown_country() {
        assert_eq!(GeocodeQuery::new("Paris", Some("Atlantis")).country, None);
        assert_eq!(GeocodeQuery::new("Paris", Some("")).country, None);
        assert_eq!(GeocodeQuery::new("Paris", Some("F1")).country, None);
        assert_eq!(GeocodeQuery::new("Paris", None).country, None);
    }

    #[test]
    fn dedupe_collapses_near_identical() {
        let deduped = dedupe_candidates(vec![
            candidate(20.0, 10.0),
            candidate(20.0001, 10.0002),
            candidate(21.0, 10.0),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].coordinates.latitude(), 20.0);
        assert_eq!(deduped[1].coordinates.latitude(), 21.0);
    }

    #[test]
    fn dedupe_keeps_distinct() {
        let deduped = dedupe_candidates(vec![candidate(1.0, 1.0), candidate(1.01, 1.0)]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn dedupe_empty() {
        assert!(dedupe_candidates(vec![]).is_empty());
    }
}
