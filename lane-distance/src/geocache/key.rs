//! Cache key normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{clean_part, country_key};

/// Normalized `"CITY NAME, CC"` key for the geocode cache.
///
/// Whitespace is trimmed and internal runs collapse to a single space,
/// trailing punctuation is dropped, and city and country are uppercased, so
/// `"new  york, us.."` and `"New York, US"` share an entry. Countries given
/// by name or alpha-3 code become their alpha-2 code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from a city name and country code.
    ///
    /// Returns `None` when the city name is blank.
    pub fn new(name: &str, country: &str) -> Option<Self> {
        let name = collapse(clean_part(name));
        if name.is_empty() {
            return None;
        }

        let country = country_key(country);
        let key = if country.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}, {}", name.to_uppercase(), country)
        };

        Some(CacheKey(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
