//! Manual online/offline override.
//!
//! Forcing offline marks the endpoint unavailable right away so every reader
//! of the availability cache agrees with the user's choice. Going back online
//! does not assume the endpoint is reachable; it probes first.

use crate::context::ResilienceContext;
use crate::dialogue::HealthProbe;
use std::sync::Arc;

const EVENT_SOURCE: &str = "mode";

/// What `set_forced_offline` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// Flag already had the requested value; nothing happened.
    Unchanged,
    WentOffline,
    /// Online again; `reachable` is the outcome of the immediate probe.
    WentOnline { reachable: bool },
}

pub struct ModeController {
    context: Arc<ResilienceContext>,
    probe: Arc<dyn HealthProbe>,
}

impl ModeController {
    pub fn new(context: Arc<ResilienceContext>, probe: Arc<dyn HealthProbe>) -> Self {
        Self { context, probe }
    }

    pub fn is_forced_offline(&self) -> bool {
        self.context.is_forced_offline()
    }

    /// Toggle forced-offline mode.
    pub async fn set_forced_offline(&self, forced: bool) -> ModeTransition {
        let previous = self.context.swap_forced_offline(forced);
        if previous == forced {
            return ModeTransition::Unchanged;
        }

        if forced {
            self.context.cache().update(false);
            self.context
                .events()
                .info(EVENT_SOURCE, "Offline mode enabled; using local responses");
            return ModeTransition::WentOffline;
        }

        self.context
            .events()
            .info(EVENT_SOURCE, "Offline mode disabled; checking endpoint");
        let reachable = self.probe.check_health().await;
        if !reachable {
            self.context.events().warn(
                EVENT_SOURCE,
                "Endpoint still unreachable after leaving offline mode",
            );
        }
        ModeTransition::WentOnline { reachable }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::Availability;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Probe that records calls and writes a fixed outcome to the cache.
    struct FixedProbe {
        context: Arc<ResilienceContext>,
        outcome: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HealthProbe for FixedProbe {
        async fn check_health(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.context.cache().update(self.outcome);
            self.outcome
        }
    }

    fn setup(outcome: bool) -> (ModeController, Arc<FixedProbe>, Arc<ResilienceContext>) {
        let context = ResilienceContext::shared();
        let probe = Arc::new(FixedProbe {
            context: context.clone(),
            outcome,
            calls: AtomicUsize::new(0),
        });
        let controller = ModeController::new(context.clone(), probe.clone());
        (controller, probe, context)
    }

    #[tokio::test]
    async fn going_offline_marks_cache_unavailable() {
        let (controller, probe, context) = setup(true);
        context.cache().update(true);

        assert_eq!(controller.set_forced_offline(true).await, ModeTransition::WentOffline);
        assert!(controller.is_forced_offline());
        assert_eq!(context.cache().read().available, Availability::Unavailable);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn going_online_probes_immediately() {
        let (controller, probe, context) = setup(true);
        controller.set_forced_offline(true).await;

        let transition = controller.set_forced_offline(false).await;
        assert_eq!(transition, ModeTransition::WentOnline { reachable: true });
        assert!(!controller.is_forced_offline());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
        assert_eq!(context.cache().read().available, Availability::Available);
    }

    #[tokio::test]
    async fn going_online_reports_unreachable_endpoint() {
        let (controller, _probe, context) = setup(false);
        controller.set_forced_offline(true).await;

        let transition = controller.set_forced_offline(false).await;
        assert_eq!(transition, ModeTransition::WentOnline { reachable: false });
        assert!(context
            .events()
            .entries()
            .iter()
            .any(|e| e.message.contains("still unreachable")));
    }

    #[tokio::test]
    async fn repeated_values_are_no_ops() {
        let (controller, probe, context) = setup(true);

        assert_eq!(controller.set_forced_offline(false).await, ModeTransition::Unchanged);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        assert_eq!(context.cache().read().available, Availability::Unknown);

        controller.set_forced_offline(true).await;
        context.cache().invalidate();
        assert_eq!(controller.set_forced_offline(true).await, ModeTransition::Unchanged);
        assert_eq!(context.cache().read().available, Availability::Unknown);
    }
}
