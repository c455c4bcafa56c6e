//! Last known reachability of the remote dialogue endpoint.
//!
//! Written by the dialogue client after every round-trip or probe and by the
//! mode controller when the user forces offline mode. Concurrent writers are
//! not serialized beyond the lock itself; the last write wins.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Reference validity window: 60 seconds.
pub const DEFAULT_VALIDITY_SECS: u64 = 60;

/// Reachability as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// No check since startup or since the last invalidation.
    Unknown,
    Available,
    Unavailable,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

/// Point-in-time copy of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySnapshot {
    pub available: Availability,
    /// Wall-clock time of the last `update`; `None` while unknown.
    pub last_checked_at: Option<DateTime<Utc>>,
}

struct CacheSlot {
    available: Availability,
    checked_at: Option<Instant>,
    checked_at_wall: Option<DateTime<Utc>>,
}

/// Thread-safe availability cache.
pub struct AvailabilityCache {
    slot: Mutex<CacheSlot>,
}

impl AvailabilityCache {
    /// Create a cache in the `Unknown` state.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(CacheSlot {
                available: Availability::Unknown,
                checked_at: None,
                checked_at_wall: None,
            }),
        }
    }

    /// Record the outcome of a check, stamped with the current time.
    pub fn update(&self, available: bool) {
        let mut slot = self.slot.lock();
        let previous = slot.available;
        slot.available = Availability::from(available);
        slot.checked_at = Some(Instant::now());
        slot.checked_at_wall = Some(Utc::now());
        drop(slot);

        tracing::debug!(
            previous = previous.as_str(),
            current = Availability::from(available).as_str(),
            "Updated availability cache"
        );
    }

    /// Whether a check happened within `max_age` of now.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        let slot = self.slot.lock();
        match (slot.available, slot.checked_at) {
            (Availability::Unknown, _) | (_, None) => false,
            (_, Some(at)) => at.elapsed() <= max_age,
        }
    }

    /// Fresh reading that says the endpoint is down.
    pub fn is_known_down(&self, max_age: Duration) -> bool {
        let slot = self.slot.lock();
        slot.available == Availability::Unavailable
            && slot.checked_at.is_some_and(|at| at.elapsed() <= max_age)
    }

    pub fn read(&self) -> AvailabilitySnapshot {
        let slot = self.slot.lock();
        AvailabilitySnapshot {
            available: slot.available,
            last_checked_at: slot.checked_at_wall,
        }
    }

    /// Forget the last reading so the next dialogue call re-probes.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock();
        slot.available = Availability::Unknown;
        slot.checked_at = None;
        slot.checked_at_wall = None;
    }
}

impl Default for AvailabilityCache {
    fn default() -> Self {
        Self::new()
    }
}
