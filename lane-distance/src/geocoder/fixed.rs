//! Geocoder with canned answers, for tests and offline runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::GeocodeError;
use super::{Candidate, GeocodeQuery, Geocoder};

/// Failure injected for the next N calls on a query.
struct ScriptedFailure {
    remaining: usize,
    make: fn() -> GeocodeError,
}

/// Geocoder that answers from a fixed table.
///
/// Queries match on their uppercased text. Unknown queries return no
/// candidates. Every call is counted, which is what most tests assert on.
#[derive(Default)]
pub struct FixedGeocoder {
    answers: HashMap<String, Vec<Candidate>>,
    failures: Mutex<HashMap<String, ScriptedFailure>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<GeocodeQuery>>,
}

impl FixedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `text` with the given candidates, best first.
    pub fn with_answer(mut self, text: &str, candidates: Vec<Candidate>) -> Self {
        self.answers.insert(text.trim().to_uppercase(), candidates);
        self
    }

    /// Fail the next `times` calls for `text` with the error built by `make`.
    pub fn with_failures(self, text: &str, times: usize, make: fn() -> GeocodeError) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(
                text.trim().to_uppercase(),
                ScriptedFailure {
                    remaining: times,
                    make,
                },
            );
        }
        self
    }

    /// Number of `geocode` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received, in call order.
    pub fn queries(&self) -> Vec<GeocodeQuery> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    fn take_failure(&self, key: &str) -> Option<GeocodeError> {
        let mut failures = self.failures.lock().ok()?;
        let failure = failures.get_mut(key)?;
        if failure.remaining == 0 {
            return None;
        }
        failure.remaining -= 1;
        Some((failure.make)())
    }
}

impl Geocoder for FixedGeocoder {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Vec<Candidate>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }

        let key = query.text.to_uppercase();
        if let Some(err) = self.take_failure(&key) {
            return Err(err);
        }

        Ok(self.answers.get(&key).cloned().unwrap_or_default())
    }
}
