//! Rate-limit configuration
//!
//! Maps the fixed throughput tiers accepted on the command line to a
//! bytes-per-second budget.

use std::fmt;
use std::str::FromStr;

use crate::core::error::{Error, Result};

/// Accepted labels and their budgets in bytes per second
pub const RATE_TIERS: [(&str, u64); 3] = [
    ("300k", 300 * 1024),
    ("700k", 700 * 1024),
    ("2M", 2 * 1024 * 1024),
];

/// Maximum sustained throughput in bytes per second; zero means unlimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimit(u64);

impl RateLimit {
    /// No throttling
    pub const UNLIMITED: RateLimit = RateLimit(0);

    /// Build a limit from a raw byte rate
    pub const fn from_bytes_per_second(bytes_per_second: u64) -> Self {
        Self(bytes_per_second)
    }

    pub fn bytes_per_second(&self) -> u64 {
        self.0
    }

    pub fn is_unlimited(&self) -> bool {
        self.0 == 0
    }

    /// Tier label for this limit, if it is one of the fixed tiers
    pub fn label(&self) -> Option<&'static str> {
        RATE_TIERS
            .iter()
            .find(|(_, bytes)| *bytes == self.0)
            .map(|(label, _)| *label)
    }
}

/// Resolve a rate-limit label
///
/// `""` is unlimited, `"300k"`, `"700k"` and `"2M"` map to their tier.
/// Anything else is rejected; matching is exact.
pub fn parse_rate_limit(label: &str) -> Result<RateLimit> {
    if label.is_empty() {
        return Ok(RateLimit::UNLIMITED);
    }

    RATE_TIERS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, bytes)| RateLimit(*bytes))
        .ok_or_else(|| Error::invalid_rate_limit(label))
}

impl FromStr for RateLimit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_rate_limit(s)
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_unlimited(), self.label()) {
            (true, _) => write!(f, "unlimited"),
            (false, Some(label)) => write!(f, "{label}/s"),
            (false, None) => write!(f, "{} B/s", self.0),
        }
    }
}
