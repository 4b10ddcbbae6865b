//! Outcome of resolving a place to coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Coordinates;

/// How an endpoint's coordinates were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    /// Exact match in the UN/LOCODE table.
    Code,
    /// Previously geocoded result from the cache store.
    Cache,
    /// Fresh answer from the fallback geocoder.
    Geocoder,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMethod::Code => "code",
            ResolutionMethod::Cache => "cache",
            ResolutionMethod::Geocoder => "geocoder",
        }
    }
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully resolved endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub coordinates: Coordinates,
    pub method: ResolutionMethod,
    /// True when the geocoder offered several distinct candidates and the
    /// first one was taken.
    pub ambiguous: bool,
}

impl Resolution {
    pub fn new(coordinates: Coordinates, method: ResolutionMethod, ambiguous: bool) -> Self {
        Self {
            coordinates,
            method,
            ambiguous,
        }
    }

    /// Whether this endpoint came from the UN/LOCODE table.
    pub fn used_code(&self) -> bool {
        self.method == ResolutionMethod::Code
    }
}
