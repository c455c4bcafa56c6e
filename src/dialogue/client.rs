use super::extract::interpret_body;
use super::health::{HealthProbe, HealthSignal, HealthStrategy};
use super::{
    DialogueError, DialogueReply, DialogueRequest, DialogueTransport, FallbackReason,
    ReplySource, RetryAttempt, TransportResponse,
};
use crate::config::{Config, EndpointConfig, HealthConfig, RetryConfig};
use crate::context::ResilienceContext;
use crate::offline::{generate_offline_response, ResponsePicker, ThreadRngPicker};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

const EVENT_SOURCE: &str = "dialogue";

/// Client for the remote creative-process endpoint.
///
/// `send` is total: whatever happens on the wire, the caller gets text.
/// Concurrent calls are not serialized; each may probe and each may update
/// the shared availability cache. Forcing offline mode mid-call stops further
/// attempts, and outcomes that land afterwards never reach the cache.
pub struct DialogueClient {
    endpoint: EndpointConfig,
    retry: RetryConfig,
    health: HealthConfig,
    cache_validity: Duration,
    context: Arc<ResilienceContext>,
    transport: Arc<dyn DialogueTransport>,
    picker: Mutex<Box<dyn ResponsePicker + Send>>,
}

impl DialogueClient {
    /// Create a client over an explicit transport.
    pub fn new(
        config: &Config,
        context: Arc<ResilienceContext>,
        transport: Arc<dyn DialogueTransport>,
    ) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            retry: config.retry.clone(),
            health: config.health.clone(),
            cache_validity: config.cache.validity(),
            context,
            transport,
            picker: Mutex::new(Box::new(ThreadRngPicker)),
        }
    }

    /// Replace the random source used for local replies.
    pub fn with_picker(self, picker: impl ResponsePicker + Send + 'static) -> Self {
        self.set_picker(picker);
        self
    }

    /// Swap the random source on a client that is already shared.
    pub fn set_picker(&self, picker: impl ResponsePicker + Send + 'static) {
        *self.picker.lock() = Box::new(picker);
    }

    pub fn context(&self) -> &Arc<ResilienceContext> {
        &self.context
    }

    /// Reply text for `input`. Never fails and never returns an empty string.
    pub async fn send(&self, input: &str, user_id: &str) -> String {
        self.send_detailed(input, user_id).await.text
    }

    /// Like [`Self::send`], also reporting where the reply came from.
    pub async fn send_detailed(&self, input: &str, user_id: &str) -> DialogueReply {
        if self.context.is_forced_offline() {
            tracing::debug!("Forced offline, skipping network");
            return self.fallback(input, user_id, FallbackReason::ForcedOffline, 0);
        }

        if self.context.cache().is_known_down(self.cache_validity) {
            tracing::info!("Availability cache says endpoint is down, using local response");
            return self.fallback(input, user_id, FallbackReason::CachedUnavailable, 0);
        }

        let request = DialogueRequest::chat(input, user_id);
        let mut attempt = RetryAttempt::first(self.retry.max_attempts.max(1));

        loop {
            tracing::debug!(attempt = %attempt, "Dialogue request attempt");

            match self.attempt(&request).await {
                Ok(text) => {
                    self.record_availability(true);
                    tracing::info!(attempt = %attempt, "Dialogue endpoint replied");
                    return DialogueReply {
                        text,
                        source: ReplySource::Remote,
                        attempts: attempt.attempt_number,
                    };
                }
                Err(e) if !e.is_retryable() => {
                    // The round-trip worked; only the payload is unusable.
                    if self.record_availability(true) {
                        self.context.events().warn(
                            EVENT_SOURCE,
                            format!("Endpoint reply unusable ({e}); using local response"),
                        );
                    }
                    return self.fallback(
                        input,
                        user_id,
                        FallbackReason::Unparseable,
                        attempt.attempt_number,
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = %attempt,
                        kind = e.kind(),
                        error = %e,
                        "Dialogue attempt failed"
                    );
                    if !attempt.has_remaining() {
                        break;
                    }
                    tokio::time::sleep(self.retry.delay()).await;
                    if self.context.is_forced_offline() {
                        tracing::debug!("Forced offline during retry pause, abandoning request");
                        return self.fallback(
                            input,
                            user_id,
                            FallbackReason::ForcedOffline,
                            attempt.attempt_number,
                        );
                    }
                    attempt = attempt.next();
                }
            }
        }

        if self.record_availability(false) {
            self.context.events().error(
                EVENT_SOURCE,
                format!(
                    "Endpoint unreachable after {} attempts; using local response",
                    attempt.max_attempts
                ),
            );
        }
        self.fallback(
            input,
            user_id,
            FallbackReason::RetriesExhausted,
            attempt.attempt_number,
        )
    }

    /// Write an observed outcome to the cache unless offline mode was forced
    /// while the request was in flight. Returns whether it was written.
    fn record_availability(&self, available: bool) -> bool {
        if self.context.is_forced_offline() {
            tracing::debug!(available, "Forced offline, discarding in-flight outcome");
            return false;
        }
        self.context.cache().update(available);
        true
    }

    /// One bounded round-trip, classified.
    async fn attempt(&self, request: &DialogueRequest) -> Result<String, DialogueError> {
        let url = self.endpoint.chat_url();
        let timeout = self.retry.request_timeout();
        let resp = bounded(timeout, self.transport.post_json(&url, request, timeout)).await?;

        if !resp.is_success() {
            return Err(DialogueError::Protocol {
                status: resp.status,
            });
        }
        interpret_body(&resp.body)
    }

    fn fallback(
        &self,
        input: &str,
        user_id: &str,
        reason: FallbackReason,
        attempts: u32,
    ) -> DialogueReply {
        let text = {
            let mut picker = self.picker.lock();
            generate_offline_response(input, user_id, &mut **picker)
        };
        tracing::debug!(reason = reason.as_str(), attempts, "Serving local response");
        DialogueReply {
            text,
            source: ReplySource::Local(reason),
            attempts,
        }
    }

    /// Probe the endpoint once and record the outcome in the cache.
    ///
    /// Forced offline short-circuits to `false` without touching the network.
    pub async fn check_health(&self) -> bool {
        if self.context.is_forced_offline() {
            self.context.cache().update(false);
            tracing::debug!("Forced offline, health probe skipped");
            return false;
        }

        let timeout = self.health.timeout();
        let outcome = match self.health.strategy {
            HealthStrategy::Echo => {
                let url = self.endpoint.chat_url();
                let probe = DialogueRequest {
                    input: self.health.sentinel_input.clone(),
                    user_id: self.health.sentinel_user.clone(),
                    context: self.health.context,
                };
                bounded(timeout, self.transport.post_json(&url, &probe, timeout)).await
            }
            HealthStrategy::Dedicated => {
                let url = self.endpoint.health_url();
                bounded(timeout, self.transport.get(&url, timeout)).await
            }
        };

        let verdict = judge(self.health.signal, outcome);
        let healthy = verdict.is_ok();
        if !self.record_availability(healthy) {
            return false;
        }

        match verdict {
            Ok(()) => self
                .context
                .events()
                .success(EVENT_SOURCE, "Health check passed; endpoint available"),
            Err(reason) => self
                .context
                .events()
                .warn(EVENT_SOURCE, format!("Health check failed: {reason}")),
        }
        healthy
    }

    /// Drop the cached reading and probe again.
    pub async fn force_refresh(&self) -> bool {
        self.context.cache().invalidate();
        self.context
            .events()
            .info(EVENT_SOURCE, "Availability cache cleared; re-checking endpoint");
        self.check_health().await
    }
}

#[async_trait]
impl HealthProbe for DialogueClient {
    async fn check_health(&self) -> bool {
        DialogueClient::check_health(self).await
    }
}

/// Enforce `timeout` on a transport future regardless of how the transport
/// handles its own deadline.
async fn bounded<F>(timeout: Duration, fut: F) -> Result<TransportResponse, DialogueError>
where
    F: std::future::Future<Output = Result<TransportResponse, DialogueError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(DialogueError::Network(format!(
            "request timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

fn judge(
    signal: HealthSignal,
    outcome: Result<TransportResponse, DialogueError>,
) -> Result<(), String> {
    match outcome {
        Ok(resp) => signal.evaluate(&resp),
        Err(e) => Err(e.to_string()),
    }
}
