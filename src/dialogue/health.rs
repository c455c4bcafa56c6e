//! Health probing of the dialogue endpoint.
//!
//! The endpoint's own health semantics are inconsistent, so both the probe
//! route and the success signal are configurable:
//!
//! | strategy    | request                                                     |
//! |-------------|-------------------------------------------------------------|
//! | `echo`      | POST chat path with a sentinel input and a health context   |
//! | `dedicated` | GET health path                                             |
//!
//! | signal               | healthy when                                       |
//! |----------------------|----------------------------------------------------|
//! | `status_and_payload` | 2xx and a JSON body that is not null / `[]` / `""` |
//! | `status_only`        | 2xx                                                |

use super::extract::degraded_reason;
use super::TransportResponse;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which request probes the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStrategy {
    /// Reuse the chat endpoint with a sentinel payload.
    #[default]
    Echo,
    /// Dedicated `GET` health route.
    Dedicated,
}

/// What counts as a healthy probe response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthSignal {
    /// Success status and a non-empty JSON payload.
    #[default]
    StatusAndPayload,
    /// Success status alone.
    StatusOnly,
}

impl HealthSignal {
    /// Judge a probe response; `Err` carries the reason it is unhealthy.
    pub fn evaluate(self, resp: &TransportResponse) -> Result<(), String> {
        if !resp.is_success() {
            return Err(format!("health probe returned HTTP {}", resp.status));
        }
        if self == Self::StatusOnly {
            return Ok(());
        }
        if resp.body.trim().is_empty() {
            return Err("health probe returned an empty body".into());
        }
        let payload: serde_json::Value = serde_json::from_str(&resp.body)
            .map_err(|_| "health probe body is not valid JSON".to_string())?;
        match degraded_reason(&payload) {
            Some(reason) => Err(format!("health probe returned {reason}")),
            None => Ok(()),
        }
    }
}

/// Something that can refresh availability on demand.
///
/// Implemented by [`super::DialogueClient`]; the mode controller depends on
/// this trait rather than the client itself.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Probe once, update the availability cache, report the outcome.
    async fn check_health(&self) -> bool;
}
