//! Remote dialogue client with retry, availability caching and local fallback.
//!
//! The client talks to the remote creative-process endpoint and always
//! produces display-ready text:
//! - Forced offline or a fresh "down" reading skips the network entirely
//! - Transport failures, error statuses and empty payloads are retried
//! - A payload that parses but has no known shape falls back immediately
//! - Every fallback is served by [`crate::offline`]
//!
//! ## Design
//! - HTTP goes through the [`transport::DialogueTransport`] seam so tests can
//!   script responses
//! - Shared state lives in an injected [`crate::context::ResilienceContext`]
//! - Health probing strategy and signal are configurable (see [`health`])

pub mod client;
pub mod error;
pub mod extract;
pub mod health;
pub mod transport;

pub use client::DialogueClient;
pub use error::DialogueError;
pub use health::HealthProbe;
pub use transport::{DialogueTransport, HttpTransport, TransportResponse};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Why a request is being made; forwarded verbatim to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DialogueContext {
    Chat,
    SystemHealthCheck,
    HealthCheck,
}

impl DialogueContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::SystemHealthCheck => "system_health_check",
            Self::HealthCheck => "health_check",
        }
    }
}

/// JSON body posted to the creative-process endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueRequest {
    pub input: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub context: DialogueContext,
}

impl DialogueRequest {
    pub fn chat(input: &str, user_id: &str) -> Self {
        Self {
            input: input.to_string(),
            user_id: user_id.to_string(),
            context: DialogueContext::Chat,
        }
    }
}

/// Why the reply came from the local generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The user switched to offline mode.
    ForcedOffline,
    /// A fresh availability reading says the endpoint is down.
    CachedUnavailable,
    /// Every attempt failed with a retryable error.
    RetriesExhausted,
    /// The endpoint answered but the payload had no recognizable reply.
    Unparseable,
}

impl FallbackReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForcedOffline => "forced_offline",
            Self::CachedUnavailable => "cached_unavailable",
            Self::RetriesExhausted => "retries_exhausted",
            Self::Unparseable => "unparseable",
        }
    }
}

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum ReplySource {
    Remote,
    Local(FallbackReason),
}

/// Reply text plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueReply {
    pub text: String,
    pub source: ReplySource,
    /// Network attempts made for this reply.
    pub attempts: u32,
}

impl DialogueReply {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ReplySource::Local(_))
    }
}

/// Position within one call's retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 1-based.
    pub attempt_number: u32,
    pub max_attempts: u32,
}

impl RetryAttempt {
    pub fn first(max_attempts: u32) -> Self {
        Self {
            attempt_number: 1,
            max_attempts,
        }
    }

    pub fn has_remaining(&self) -> bool {
        self.attempt_number < self.max_attempts
    }

    pub fn next(self) -> Self {
        Self {
            attempt_number: self.attempt_number + 1,
            ..self
        }
    }
}

impl std::fmt::Display for RetryAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.attempt_number, self.max_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_user_id() {
        let req = DialogueRequest::chat("hello", "Norms Of AGI");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"input": "hello", "userId": "Norms Of AGI", "context": "chat"})
        );
    }

    #[test]
    fn health_contexts_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&DialogueContext::SystemHealthCheck).unwrap(),
            "\"system_health_check\""
        );
        assert_eq!(DialogueContext::HealthCheck.as_str(), "health_check");
    }

    #[test]
    fn retry_attempt_progression() {
        let attempt = RetryAttempt::first(3);
        assert!(attempt.has_remaining());
        let last = attempt.next().next();
        assert_eq!(last.attempt_number, 3);
        assert!(!last.has_remaining());
        assert_eq!(last.to_string(), "3/3");
    }

    #[test]
    fn reply_fallback_flag() {
        let local = DialogueReply {
            text: "offline".into(),
            source: ReplySource::Local(FallbackReason::ForcedOffline),
            attempts: 0,
        };
        assert!(local.is_fallback());
        let remote = DialogueReply {
            text: "hi".into(),
            source: ReplySource::Remote,
            attempts: 1,
        };
        assert!(!remote.is_fallback());
    }
}
