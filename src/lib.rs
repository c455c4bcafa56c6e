//! Client-side resilience layer for a conversational "creative process" API.
//!
//! Talks to the remote endpoint, caches whether it is reachable, retries with
//! a fixed delay, and falls back to a local keyword-matched reply generator.
//! A manual offline mode short-circuits the network entirely.
//!
//! ```ignore
//! let config = solara_bridge::Config::load(None)?;
//! let bridge = solara_bridge::SolaraBridge::from_config(&config);
//! let reply = bridge.send("hello", None).await;
//! println!("{}", reply.text);
//! ```

pub mod availability;
pub mod bridge;
pub mod config;
pub mod context;
pub mod dialogue;
pub mod events;
pub mod mode;
pub mod offline;

pub use availability::{Availability, AvailabilityCache, AvailabilitySnapshot};
pub use bridge::SolaraBridge;
pub use config::Config;
pub use context::ResilienceContext;
pub use dialogue::{
    DialogueClient, DialogueContext, DialogueError, DialogueReply, DialogueRequest,
    FallbackReason, ReplySource,
};
pub use events::{EventEntry, EventLevel, EventLog};
pub use mode::{ModeController, ModeTransition};
pub use offline::{generate_offline_response, OfflineCategory, ResponsePicker};
