//! Rate limiting over the key-value store's atomic counters.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{KeyValueStore, StoreError};

const RATE_LIMIT_PREFIX: &str = "ratelimit:";

/// Command throttle: burst capacity per one-second window.
pub const COMMAND_BURST: u64 = 20;

pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Fixed window: increments the bucket, arming the window's expiry
    /// on the first hit. Returns `false` once the count exceeds
    /// `limit`; the bucket resets when the window elapses.
    pub async fn allow(
        &self,
        bucket: &str,
        limit: u64,
        window: Duration,
    ) -> Result<bool, StoreError> {
        let key = format!("{RATE_LIMIT_PREFIX}{bucket}");
        let count = self.store.incr(&key).await?;
        if count == 1 {
            self.store.expire(&key, window).await?;
        }
        Ok(count as u64 <= limit)
    }

    /// Command throttling shaped like a token bucket (burst 20, refill
    /// 10/s on average), implemented as a one-second fixed window.
    /// Moderate-precision throttling, not a strict burst guarantee.
    pub async fn allow_command(&self, bucket: &str) -> Result<bool, StoreError> {
        self.allow(bucket, COMMAND_BURST, Duration::from_secs(1)).await
    }
}
