//! Wiring of context, client and mode controller into one handle.

use crate::availability::AvailabilitySnapshot;
use crate::config::Config;
use crate::context::ResilienceContext;
use crate::dialogue::{DialogueClient, DialogueReply, DialogueTransport, HttpTransport};
use crate::mode::{ModeController, ModeTransition};
use crate::offline::ResponsePicker;
use std::sync::Arc;

/// Everything a caller needs to chat through the resilience layer.
pub struct SolaraBridge {
    context: Arc<ResilienceContext>,
    client: Arc<DialogueClient>,
    mode: ModeController,
    default_user_id: String,
}

impl SolaraBridge {
    /// Build over the reqwest transport.
    pub fn from_config(config: &Config) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn DialogueTransport>) -> Self {
        let context = ResilienceContext::shared();
        let client = Arc::new(DialogueClient::new(config, context.clone(), transport));
        let mode = ModeController::new(context.clone(), client.clone());
        Self {
            context,
            client,
            mode,
            default_user_id: config.default_user_id.clone(),
        }
    }

    /// Use `picker` to choose among canned local replies.
    pub fn with_picker(self, picker: impl ResponsePicker + Send + 'static) -> Self {
        self.client.set_picker(picker);
        self
    }

    pub fn context(&self) -> &Arc<ResilienceContext> {
        &self.context
    }

    pub fn client(&self) -> &Arc<DialogueClient> {
        &self.client
    }

    pub fn mode(&self) -> &ModeController {
        &self.mode
    }

    /// Send as `user_id`, or as the configured default user.
    pub async fn send(&self, input: &str, user_id: Option<&str>) -> DialogueReply {
        let user = user_id.unwrap_or(&self.default_user_id);
        self.client.send_detailed(input, user).await
    }

    pub async fn check_health(&self) -> bool {
        self.client.check_health().await
    }

    pub async fn force_refresh(&self) -> bool {
        self.client.force_refresh().await
    }

    pub async fn set_forced_offline(&self, forced: bool) -> ModeTransition {
        self.mode.set_forced_offline(forced).await
    }

    pub fn is_forced_offline(&self) -> bool {
        self.mode.is_forced_offline()
    }

    pub fn availability(&self) -> AvailabilitySnapshot {
        self.context.cache().read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::Availability;
    use crate::dialogue::{FallbackReason, ReplySource};
    use crate::offline::{responses_for, OfflineCategory, SequencePicker};

    #[tokio::test]
    async fn injected_picker_reaches_local_replies() {
        let bridge =
            SolaraBridge::from_config(&Config::default()).with_picker(SequencePicker::new(vec![2]));
        bridge.set_forced_offline(true).await;

        let reply = bridge.send("hello", None).await;
        assert_eq!(reply.source, ReplySource::Local(FallbackReason::ForcedOffline));
        assert_eq!(reply.text, responses_for(OfflineCategory::Greeting)[2]);
    }

    #[tokio::test]
    async fn handles_share_one_context() {
        let bridge = SolaraBridge::from_config(&Config::default());
        bridge.set_forced_offline(true).await;

        assert!(bridge.client().context().is_forced_offline());
        assert!(bridge.mode().is_forced_offline());
        assert_eq!(bridge.availability().available, Availability::Unavailable);
    }
}
