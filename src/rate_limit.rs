/// Token-bucket admission control for outbound provider fetches.
///
/// The bucket refills continuously at `capacity` tokens per minute and holds at
/// most `capacity` tokens, so bursts of up to `capacity` requests go through
/// immediately while the long-run rate stays at or below `capacity`/minute.
/// `consume` blocks the calling thread when the bucket is short.
use std::time::{Duration, Instant};

use tracing::debug;

/// Time source used by [`TokenBucket`]. Swapped out in tests.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `Instant::now` and `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug)]
pub struct TokenBucket<C: Clock = SystemClock> {
    capacity: f64,
    tokens: f64,
    last_refill: Instant,
    clock: C,
}

impl TokenBucket<SystemClock> {
    /// Create a full bucket admitting `rate_per_min` requests per minute.
    pub fn new(rate_per_min: u32) -> Self {
        Self::with_clock(rate_per_min, SystemClock)
    }
}

impl<C: Clock> TokenBucket<C> {
    /// A zero rate is raised to one request per minute.
    pub fn with_clock(rate_per_min: u32, clock: C) -> Self {
        let capacity = f64::from(rate_per_min.max(1));
        Self {
            capacity,
            tokens: capacity,
            last_refill: clock.now(),
            clock,
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Tokens currently available, without refilling.
    pub fn available(&self) -> f64 {
        self.tokens
    }

    /// Take `n` tokens, sleeping first if the bucket does not hold enough.
    ///
    /// Returns how long the caller was blocked (zero on the fast path).
    pub fn consume(&mut self, n: f64) -> Duration {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * (self.capacity / 60.0)).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= n {
            self.tokens -= n;
            return Duration::ZERO;
        }

        let sleep_for = Duration::from_secs_f64((n - self.tokens) * (60.0 / self.capacity));
        debug!("Rate limit sleep: {:.2}s", sleep_for.as_secs_f64());
        self.clock.sleep(sleep_for);
        self.tokens = 0.0;
        self.last_refill = self.clock.now();
        sleep_for
    }

    /// Take a single token.
    pub fn consume_one(&mut self) -> Duration {
        self.consume(1.0)
    }
}
