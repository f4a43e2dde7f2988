//! Login rate limiting
//!
//! Keyed GCRA limiter: every login identifier (the normalized email) gets
//! its own bucket so one noisy account cannot lock out the others.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::utils::errors::{CampHubError, Result};

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<KeyedLimiter>,
}

impl std::fmt::Debug for RateLimitMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitMiddleware")
            .field("tracked_keys", &self.limiter.len())
            .finish()
    }
}

impl RateLimitMiddleware {
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        let per_minute = NonZeroU32::new(config.login_attempts_per_minute)
            .ok_or_else(|| CampHubError::Config("login_attempts_per_minute must be positive".to_string()))?;
        let burst = NonZeroU32::new(config.login_burst)
            .ok_or_else(|| CampHubError::Config("login_burst must be positive".to_string()))?;

        let quota = Quota::per_minute(per_minute).allow_burst(burst);
        Ok(Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        })
    }

    /// Consume one attempt for `key`
    pub fn check(&self, key: &str) -> Result<()> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => {
                debug!(key = %key, "Rate limit check passed");
                Ok(())
            }
            Err(_) => {
                warn!(key = %key, "Rate limit exceeded");
                Err(CampHubError::RateLimitExceeded)
            }
        }
    }

    /// Drop buckets that have fully refilled
    pub fn cleanup(&self) -> usize {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        self.limiter.len()
    }
}
