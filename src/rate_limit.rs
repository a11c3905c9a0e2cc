//! Global token bucket for upstream API calls.
//!
//! One bucket is shared by every call site (sampler thread, update passes,
//! CLI commands) since the upstream quota is account-wide. Callers block
//! until a permit is available instead of failing.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

pub struct ApiBudget {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl ApiBudget {
    pub fn new(requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second.max(1)).expect("nonzero by max(1)"),
        );
        ApiBudget {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Blocks until the bucket has a token. Never errors; exhausting the
    /// budget just means waiting.
    pub fn acquire(&self) {
        while self.limiter.check().is_err() {
            thread::sleep(Duration::from_millis(50));
        }
    }
}
