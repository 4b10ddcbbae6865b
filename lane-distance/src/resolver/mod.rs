//! Place resolution.
//!
//! A place resolves through three tiers, tried in order until one answers:
//! the UN/LOCODE table, the geocode cache, then the fallback geocoder.
//! Geocoder answers are written back to the cache.

mod error;
mod retry;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_retry::RetryIf;
use tracing::{debug, warn};

use crate::domain::{Locode, Resolution, ResolutionMethod, split_place};
use crate::geocache::{CacheEntry, CacheKey, GeocodeStore};
use crate::geocoder::{GeocodeError, GeocodeQuery, Geocoder};
use crate::locodes::LocodeTable;

pub use error::ResolutionError;
pub use retry::{DEFAULT_MAX_RETRIES, RetryConfig};

/// A resolution tier, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Code,
    Cache,
    Geocoder,
}

const TIERS: [Tier; 3] = [Tier::Code, Tier::Cache, Tier::Geocoder];

/// One place to resolve, already split into its parts.
struct Place<'a> {
    name: &'a str,
    country: &'a str,
    code: Option<&'a str>,
}

impl Place<'_> {
    fn describe(&self) -> String {
        CacheKey::new(self.name, self.country)
            .map(|k| k.to_string())
            .or_else(|| self.code.map(|c| c.trim().to_uppercase()))
            .unwrap_or_default()
    }
}

/// Result of a resolution together with the geocoder calls it cost.
#[derive(Debug)]
pub struct Resolved {
    pub result: Result<Resolution, ResolutionError>,
    pub geocoder_calls: usize,
}

/// Resolves places to coordinates.
///
/// Cheap to share behind an `Arc`; all state is either immutable or
/// internally synchronized.
pub struct Resolver<G, S> {
    table: Arc<LocodeTable>,
    store: Arc<S>,
    geocoder: Arc<G>,
    retry: RetryConfig,
    geocoder_calls: AtomicUsize,
}

impl<G: Geocoder, S: GeocodeStore> Resolver<G, S> {
    pub fn new(table: Arc<LocodeTable>, store: Arc<S>, geocoder: Arc<G>) -> Self {
        Self {
            table,
            store,
            geocoder,
            retry: RetryConfig::default(),
            geocoder_calls: AtomicUsize::new(0),
        }
    }

    /// Set the retry policy for geocoder failures.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn table(&self) -> &LocodeTable {
        &self.table
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Geocoder calls made over the resolver's lifetime, retries included.
    pub fn geocoder_calls(&self) -> usize {
        self.geocoder_calls.load(Ordering::Relaxed)
    }

    /// Resolve a city name and country, preferring `code` when it is known.
    pub async fn resolve(
        &self,
        name: &str,
        country: &str,
        code: Option<&str>,
    ) -> Result<Resolution, ResolutionError> {
        self.resolve_counted(name, country, code).await.result
    }

    /// Resolve a `"City, CC"` place string.
    pub async fn resolve_place(
        &self,
        place: &str,
        code: Option<&str>,
    ) -> Result<Resolution, ResolutionError> {
        let (name, country) = split_place(place);
        self.resolve(name, country, code).await
    }

    /// Like [`Resolver::resolve_place`], also reporting geocoder usage.
    pub async fn resolve_place_counted(&self, place: &str, code: Option<&str>) -> Resolved {
        let (name, country) = split_place(place);
        self.resolve_counted(name, country, code).await
    }

    async fn resolve_counted(&self, name: &str, country: &str, code: Option<&str>) -> Resolved {
        let place = Place {
            name: name.trim(),
            country: country.trim(),
            code: code.map(str::trim).filter(|c| !c.is_empty()),
        };
        let mut calls = 0;

        for tier in TIERS {
            match self.try_tier(tier, &place, &mut calls).await {
                Ok(Some(resolution)) => {
                    debug!(
                        place = %place.describe(),
                        method = %resolution.method,
                        ambiguous = resolution.ambiguous,
                        "Resolved place"
                    );
                    return Resolved {
                        result: Ok(resolution),
                        geocoder_calls: calls,
                    };
                }
                Ok(None) => continue,
                Err(e) => {
                    debug!(place = %place.describe(), error = %e, "Resolution failed");
                    return Resolved {
                        result: Err(e),
                        geocoder_calls: calls,
                    };
                }
            }
        }

        Resolved {
            result: Err(ResolutionError::NotFound(place.describe())),
            geocoder_calls: calls,
        }
    }

    async fn try_tier(
        &self,
        tier: Tier,
        place: &Place<'_>,
        calls: &mut usize,
    ) -> Result<Option<Resolution>, ResolutionError> {
        match tier {
            Tier::Code => Ok(self.from_table(place)),
            Tier::Cache => Ok(self.from_cache(place).await),
            Tier::Geocoder => self.from_geocoder(place, calls).await.map(Some),
        }
    }

    fn from_table(&self, place: &Place<'_>) -> Option<Resolution> {
        let entry = match place.code {
            Some(code) => self.table.lookup(code),
            // A bare name already written as a code, e.g. "FRPAR". Strict
            // parsing keeps five-letter city names like "Paris" or "Milan"
            // from colliding with unrelated codes.
            None if place.country.is_empty() => Locode::parse(place.name)
                .ok()
                .and_then(|code| self.table.get(&code)),
            None => None,
        }?;

        Some(Resolution::new(
            entry.coordinates,
            ResolutionMethod::Code,
            false,
        ))
    }

    async fn from_cache(&self, place: &Place<'_>) -> Option<Resolution> {
        let key = CacheKey::new(place.name, place.country)?;
        let entry = self.store.get(&key).await?;

        match entry.coordinates() {
            Ok(coordinates) => Some(Resolution::new(
                coordinates,
                ResolutionMethod::Cache,
                entry.ambiguous,
            )),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring invalid cache entry");
                None
            }
        }
    }

    async fn from_geocoder(
        &self,
        place: &Place<'_>,
        calls: &mut usize,
    ) -> Result<Resolution, ResolutionError> {
        let key = CacheKey::new(place.name, place.country).ok_or(ResolutionError::EmptyQuery)?;
        let query = GeocodeQuery::new(place.name, Some(place.country));

        let outcome = RetryIf::spawn(
            self.retry.strategy(),
            || {
                *calls += 1;
                self.geocoder_calls.fetch_add(1, Ordering::Relaxed);
                self.geocoder.geocode(&query)
            },
            |e: &GeocodeError| {
                let transient = e.is_transient();
                if transient {
                    debug!(query = %query.text, error = %e, "Retrying geocoder call");
                }
                transient
            },
        )
        .await;

        let candidates = outcome.map_err(|e| ResolutionError::ServiceUnavailable {
            query: key.to_string(),
            attempts: *calls,
            message: e.to_string(),
        })?;

        let best = candidates
            .first()
            .ok_or_else(|| ResolutionError::NotFound(key.to_string()))?;
        let ambiguous = candidates.len() > 1;
        if ambiguous {
            debug!(
                key = %key,
                candidates = candidates.len(),
                "Ambiguous geocoder match, taking first"
            );
        }

        let resolution = Resolution::new(best.coordinates, ResolutionMethod::Geocoder, ambiguous);

        let entry = CacheEntry::new(resolution.coordinates, resolution.method, ambiguous);
        if let Err(e) = self.store.put(key.clone(), entry).await {
            warn!(key = %key, error = %e, "Failed to cache geocoder result");
        }

        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;
    use crate::geocache::MemoryStore;
    use crate::geocoder::{Candidate, FixedGeocoder};
    use std::time::Duration;

    fn candidate(lat: f64, lon: f64) -> Candidate {
        Candidate::new(Coordinates::new(lat, lon).unwrap(), 0.9)
    }

    fn resolver(geocoder: FixedGeocoder) -> Resolver<FixedGeocoder, MemoryStore> {
        Resolver::new(
            Arc::new(LocodeTable::bundled().unwrap()),
            Arc::new(MemoryStore::new()),
            Arc::new(geocoder),
        )
        .with_retry(RetryConfig::new(2).with_base_delay_ms(10))
    }

    #[tokio::test]
    async fn code_tier_wins() {
        let geocoder = FixedGeocoder::new().with_answer("New York", vec![candidate(1.0, 1.0)]);
        let resolver = resolver(geocoder);

        let resolution = resolver
            .resolve("New York", "US", Some("usnyc"))
            .await
            .unwrap();

        assert_eq!(resolution.method, ResolutionMethod::Code);
        assert!(!resolution.ambiguous);
        assert!((resolution.coordinates.latitude() - 40.7).abs() < 0.01);
        assert_eq!(resolver.geocoder_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_code_falls_through_to_geocoder() {
        let geocoder = FixedGeocoder::new().with_answer("Lyon", vec![candidate(45.76, 4.83)]);
        let resolver = resolver(geocoder);

        let resolution = resolver.resolve("Lyon", "FR", Some("FRZZZ")).await.unwrap();
        assert_eq!(resolution.method, ResolutionMethod::Geocoder);
    }

    #[tokio::test]
    async fn name_as_code() {
        let resolver = resolver(FixedGeocoder::new());

        let resolution = resolver.resolve_place(" FRPAR ", None).await.unwrap();
        assert_eq!(resolution.method, ResolutionMethod::Code);
    }

    #[tokio::test]
    async fn city_name_shaped_like_a_code_is_geocoded() {
        // "PARIS" is a well-formed code (PA + RIS) that sits in the table.
        let table = LocodeTable::from_reader(
            "LOCODE,Name,Coordinates\nPARIS,Somewhere in Panama,0900N 07930W\n".as_bytes(),
            "test",
        )
        .unwrap();
        let geocoder = FixedGeocoder::new()
            .with_answer("Paris", vec![candidate(48.86, 2.35)])
            .with_answer("frpar", vec![candidate(48.86, 2.35)]);
        let resolver = Resolver::new(
            Arc::new(table),
            Arc::new(MemoryStore::new()),
            Arc::new(geocoder),
        );

        let paris = resolver.resolve_place("Paris", None).await.unwrap();
        assert_eq!(paris.method, ResolutionMethod::Geocoder);
        assert!((paris.coordinates.latitude() - 48.86).abs() < 1e-9);

        let lowercase = resolver.resolve_place("frpar", None).await.unwrap();
        assert_eq!(lowercase.method, ResolutionMethod::Geocoder);

        let code = resolver.resolve_place("PARIS", None).await.unwrap();
        assert_eq!(code.method, ResolutionMethod::Code);
    }

    #[tokio::test]
    async fn name_with_country_is_not_a_code() {
        let geocoder = FixedGeocoder::new().with_answer("USNYC", vec![candidate(5.0, 5.0)]);
        let resolver = resolver(geocoder);

        let resolution = resolver.resolve("USNYC", "US", None).await.unwrap();
        assert_eq!(resolution.method, ResolutionMethod::Geocoder);
    }

    #[tokio::test]
    async fn second_resolve_hits_cache() {
        let geocoder = FixedGeocoder::new().with_answer("Lyon", vec![candidate(45.76, 4.83)]);
        let resolver = resolver(geocoder);

        let first = resolver.resolve_place("Lyon, FR", None).await.unwrap();
        let second = resolver.resolve_place("  lyon ,  fr", None).await.unwrap();

        assert_eq!(first.method, ResolutionMethod::Geocoder);
        assert_eq!(second.method, ResolutionMethod::Cache);
        assert_eq!(first.coordinates, second.coordinates);
        assert_eq!(resolver.geocoder_calls(), 1);
        assert_eq!(resolver.store().len().await, 1);
    }

    #[tokio::test]
    async fn several_candidates_are_ambiguous() {
        let geocoder = FixedGeocoder::new().with_answer(
            "Springfield",
            vec![candidate(39.78, -89.65), candidate(37.21, -93.29)],
        );
        let resolver = resolver(geocoder);

        let resolution = resolver.resolve("Springfield", "US", None).await.unwrap();
        assert!(resolution.ambiguous);
        assert!((resolution.coordinates.latitude() - 39.78).abs() < 1e-9);

        // The flag survives the round-trip through the cache.
        let cached = resolver.resolve("Springfield", "US", None).await.unwrap();
        assert_eq!(cached.method, ResolutionMethod::Cache);
        assert!(cached.ambiguous);
    }

    #[tokio::test]
    async fn no_candidates_is_not_found() {
        let resolver = resolver(FixedGeocoder::new());

        let err = resolver.resolve("Atlantis", "ZZ", None).await.unwrap_err();
        assert_eq!(err, ResolutionError::NotFound("ATLANTIS, ZZ".into()));
        assert_eq!(resolver.store().len().await, 0);
    }

    #[tokio::test]
    async fn empty_query() {
        let resolver = resolver(FixedGeocoder::new());

        assert_eq!(
            resolver.resolve("  ", "US", None).await.unwrap_err(),
            ResolutionError::EmptyQuery
        );
        assert_eq!(
            resolver.resolve("", "", Some("XXXXX")).await.unwrap_err(),
            ResolutionError::EmptyQuery
        );
        assert_eq!(resolver.geocoder_calls(), 0);
    }

    #[tokio::test]
    async fn empty_name_with_known_code() {
        let resolver = resolver(FixedGeocoder::new());
        let resolution = resolver.resolve("", "", Some("JPTYO")).await.unwrap();
        assert!(resolution.used_code());
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let geocoder = FixedGeocoder::new()
            .with_answer("Lyon", vec![candidate(45.76, 4.83)])
            .with_failures("Lyon", 2, || GeocodeError::RateLimited);
        let resolver = resolver(geocoder);

        let resolved = resolver.resolve_place_counted("Lyon, FR", None).await;
        assert!(resolved.result.is_ok());
        assert_eq!(resolved.geocoder_calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_are_bounded() {
        let geocoder =
            FixedGeocoder::new().with_failures("Lyon", 10, || GeocodeError::RateLimited);
        let resolver = resolver(geocoder);

        let err = resolver.resolve("Lyon", "FR", None).await.unwrap_err();
        assert_eq!(
            err,
            ResolutionError::ServiceUnavailable {
                query: "LYON, FR".into(),
                attempts: 3,
                message: "rate limited by geocoding service".into(),
            }
        );
        assert_eq!(resolver.geocoder_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_waits_between_attempts() {
        let geocoder = FixedGeocoder::new()
            .with_answer("Lyon", vec![candidate(45.76, 4.83)])
            .with_failures("Lyon", 2, || GeocodeError::RateLimited);
        let resolver = Resolver::new(
            Arc::new(LocodeTable::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(geocoder),
        )
        .with_retry(RetryConfig::new(2).with_base_delay_ms(100));

        let start = tokio::time::Instant::now();
        resolver.resolve("Lyon", "FR", None).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(200 + 400));
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        // A rejected token fails identically on every attempt, so it is
        // reported after one call instead of spending retries.
        let geocoder = FixedGeocoder::new().with_failures("Lyon", 10, || GeocodeError::Unauthorized);
        let resolver = resolver(geocoder);

        let err = resolver.resolve("Lyon", "FR", None).await.unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::ServiceUnavailable { attempts: 1, .. }
        ));
        assert_eq!(resolver.geocoder_calls(), 1);
    }

    #[tokio::test]
    async fn country_filter_passed_to_geocoder() {
        let geocoder = Arc::new(
            FixedGeocoder::new().with_answer("Paris", vec![candidate(33.66, -95.55)]),
        );
        let resolver = Resolver::new(
            Arc::new(LocodeTable::new()),
            Arc::new(MemoryStore::new()),
            Arc::clone(&geocoder),
        );

        resolver.resolve("Paris", "us", None).await.unwrap();
        resolver.resolve("Tokyo", "", None).await.unwrap_err();

        let queries = geocoder.queries();
        assert_eq!(queries[0].country.as_deref(), Some("US"));
        assert_eq!(queries[1].country, None);
    }

    #[tokio::test]
    async fn country_name_and_code_share_a_cache_entry() {
        let geocoder = Arc::new(
            FixedGeocoder::new().with_answer("Paris", vec![candidate(48.86, 2.35)]),
        );
        let resolver = Resolver::new(
            Arc::new(LocodeTable::new()),
            Arc::new(MemoryStore::new()),
            Arc::clone(&geocoder),
        );

        let first = resolver.resolve_place("Paris, France", None).await.unwrap();
        let second = resolver.resolve_place("Paris, FR", None).await.unwrap();
        let third = resolver.resolve_place("paris., fra;", None).await.unwrap();

        assert_eq!(first.method, ResolutionMethod::Geocoder);
        assert_eq!(second.method, ResolutionMethod::Cache);
        assert_eq!(third.method, ResolutionMethod::Cache);
        assert_eq!(resolver.geocoder_calls(), 1);
        assert_eq!(geocoder.queries()[0].country.as_deref(), Some("FR"));
        assert_eq!(resolver.store().len().await, 1);
    }
}
