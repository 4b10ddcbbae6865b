//! Backoff policy for transient geocoder failures.

use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Retry configuration for geocoder calls.
///
/// Delays double from `2 * base_delay_ms`, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt; 0 disables retrying.
    pub max_retries: usize,
    /// Backoff unit in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl RetryConfig {
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Set the backoff unit.
    pub fn with_base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    /// Set the delay cap.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// No retries at all.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    /// Delays to wait between attempts, ready for `tokio_retry`.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> + Send + use<> {
        ExponentialBackoff::from_millis(2)
            .factor(self.base_delay_ms)
            .max_delay(self.max_delay)
            .take(self.max_retries)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: 250,
            max_delay: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.base_delay_ms, 250);
        assert_eq!(config.max_delay, Duration::from_secs(5));
    }

    #[test]
    fn delays_double() {
        let delays: Vec<_> = RetryConfig::new(4).strategy().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000),
            ]
        );
    }

    #[test]
    fn delays_are_capped() {
        let delays: Vec<_> = RetryConfig::new(6)
            .with_max_delay(Duration::from_secs(3))
            .strategy()
            .collect();
        assert_eq!(delays.len(), 6);
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(3)));
        assert_eq!(delays[5], Duration::from_secs(3));
    }

    #[test]
    fn disabled_has_no_delays() {
        assert_eq!(RetryConfig::disabled().strategy().count(), 0);
    }
}
