//! Environment-driven application configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::batch::DEFAULT_BATCH_SIZE;
use crate::geocoder::DEFAULT_MIN_INTERVAL;
use crate::resolver::DEFAULT_MAX_RETRIES;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default geocode cache file.
pub const DEFAULT_CACHE_PATH: &str = "geocode_cache.json";

/// Errors reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Mapbox access token (`MAPBOX_TOKEN`); geocoding is unavailable without it
    pub mapbox_token: Option<String>,
    /// Listen address (`LANE_BIND_ADDR`)
    pub bind_addr: SocketAddr,
    /// Geocode cache file (`LANE_CACHE_PATH`)
    pub cache_path: PathBuf,
    /// Extra UN/LOCODE CSV merged over the bundled table (`LOCODE_TABLE_PATH`)
    pub locode_table_path: Option<PathBuf>,
    /// Minimum spacing between geocoder requests (`GEOCODE_MIN_INTERVAL_MS`)
    pub geocode_min_interval: Duration,
    /// Retries after a transient geocoder failure (`GEOCODE_MAX_RETRIES`)
    pub geocode_max_retries: usize,
    /// Rows resolved concurrently (`LANE_BATCH_SIZE`)
    pub batch_size: usize,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("LANE_BIND_ADDR") {
            Some(v) => parse("LANE_BIND_ADDR", &v)?,
            None => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        let geocode_min_interval = match get("GEOCODE_MIN_INTERVAL_MS") {
            Some(v) => Duration::from_millis(parse("GEOCODE_MIN_INTERVAL_MS", &v)?),
            None => DEFAULT_MIN_INTERVAL,
        };

        let geocode_max_retries = match get("GEOCODE_MAX_RETRIES") {
            Some(v) => parse("GEOCODE_MAX_RETRIES", &v)?,
            None => DEFAULT_MAX_RETRIES,
        };

        let batch_size = match get("LANE_BATCH_SIZE") {
            Some(v) => parse::<usize>("LANE_BATCH_SIZE", &v)?,
            None => DEFAULT_BATCH_SIZE,
        };
        if batch_size == 0 {
            return Err(ConfigError::Invalid {
                var: "LANE_BATCH_SIZE",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            mapbox_token: get("MAPBOX_TOKEN").map(|t| t.trim().to_string()),
            bind_addr,
            cache_path: get("LANE_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
            locode_table_path: get("LOCODE_TABLE_PATH").map(PathBuf::from),
            geocode_min_interval,
            geocode_max_retries,
            batch_size,
        })
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
