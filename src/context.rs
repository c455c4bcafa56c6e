//! Shared state owned by the composition root.
//!
//! One [`ResilienceContext`] is built per process (or per test) and handed
//! to the dialogue client and the mode controller as an `Arc`.

use crate::availability::AvailabilityCache;
use crate::events::EventLog;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct ResilienceContext {
    cache: AvailabilityCache,
    forced_offline: AtomicBool,
    events: EventLog,
}

impl ResilienceContext {
    /// Online mode, unknown availability, empty event log.
    pub fn new() -> Self {
        Self {
            cache: AvailabilityCache::new(),
            forced_offline: AtomicBool::new(false),
            events: EventLog::new(),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn cache(&self) -> &AvailabilityCache {
        &self.cache
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn is_forced_offline(&self) -> bool {
        self.forced_offline.load(Ordering::SeqCst)
    }

    /// Store the flag, returning the previous value.
    pub(crate) fn swap_forced_offline(&self, forced: bool) -> bool {
        self.forced_offline.swap(forced, Ordering::SeqCst)
    }
}

impl Default for ResilienceContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::Availability;

    #[test]
    fn fresh_context_is_online_and_unknown() {
        let ctx = ResilienceContext::new();
        assert!(!ctx.is_forced_offline());
        assert_eq!(ctx.cache().read().available, Availability::Unknown);
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn swap_returns_previous_flag() {
        let ctx = ResilienceContext::new();
        assert!(!ctx.swap_forced_offline(true));
        assert!(ctx.is_forced_offline());
        assert!(ctx.swap_forced_offline(false));
        assert!(!ctx.is_forced_offline());
    }

    #[test]
    fn contexts_are_isolated() {
        let a = ResilienceContext::shared();
        let b = ResilienceContext::shared();
        a.cache().update(false);
        a.swap_forced_offline(true);
        assert_eq!(b.cache().read().available, Availability::Unknown);
        assert!(!b.is_forced_offline());
    }
}
