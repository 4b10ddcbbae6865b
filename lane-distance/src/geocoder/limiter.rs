//! Process-wide request spacing for the geocoding service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default spacing between requests: one per second.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Enforces a minimum interval between dispatched requests.
///
/// A single limiter is shared (via `Arc`) by every client that talks to the
/// same upstream quota. Callers that arrive early wait; they are admitted
/// one at a time in arrival order, since tokio's mutex is fair. Nothing is
/// dropped.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
    dispatched: AtomicU64,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
            dispatched: AtomicU64::new(0),
        }
    }

    /// Wait until a request may be dispatched, then claim the slot.
    pub async fn acquire(&self) {
        let mut last = self.last_dispatch.lock().await;

        if let Some(prev) = *last {
            tokio::time::sleep_until(prev + self.min_interval).await;
        }

        *last = Some(Instant::now());
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Total number of slots handed out.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
