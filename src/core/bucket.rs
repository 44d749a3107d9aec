//! Token bucket used to pace throttled downloads

use tokio::time::{Duration, Instant};

use crate::core::rate::RateLimit;

/// Token bucket with capacity and refill rate both equal to the byte rate
///
/// Tokens accrue continuously and are capped at capacity. A request is
/// never split: [`TokenBucket::reserve`] takes the whole amount at once,
/// letting the balance go negative, and reports how long the caller has to
/// wait before the balance is back to zero.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket, or `None` when the limit is unlimited
    pub fn new(limit: RateLimit) -> Option<Self> {
        if limit.is_unlimited() {
            return None;
        }

        let rate = limit.bytes_per_second() as f64;
        Some(Self {
            capacity: rate,
            refill_per_sec: rate,
            tokens: rate,
            last_refill: Instant::now(),
        })
    }

    /// Burst size in bytes
    pub fn capacity(&self) -> u64 {
        self.capacity as u64
    }

    /// Tokens currently available; negative while a reservation is outstanding
    #[cfg(test)]
    fn available(&mut self) -> f64 {
        self.refill(Instant::now());
        self.tokens
    }

    /// Take `amount` tokens and return how long to wait before using them
    pub fn reserve(&mut self, amount: usize) -> Duration {
        self.refill(Instant::now());
        self.tokens -= amount as f64;

        if self.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-self.tokens / self.refill_per_sec)
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }
}
