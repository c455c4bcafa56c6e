//! Runtime configuration for the dialogue bridge.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file
//! at all) yields the reference behavior: 3 attempts, 1 s between attempts,
//! 5 s per request, 60 s availability window, echo-style health probe.
//!
//! Lookup order: explicit path, `SOLARA_CONFIG`, then the platform config
//! directory (`solara-bridge/config.toml`). `SOLARA_BASE_URL` and
//! `SOLARA_USER_ID` override the file.

use crate::dialogue::health::{HealthSignal, HealthStrategy};
use crate::dialogue::DialogueContext;
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Hosted agent endpoint used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "https://cm911hp5c9pjms4hfxzz4rmmz.agent.a.smyth.ai";
pub const DEFAULT_USER_ID: &str = "Norms Of AGI";

const CONFIG_ENV: &str = "SOLARA_CONFIG";
const BASE_URL_ENV: &str = "SOLARA_BASE_URL";
const USER_ID_ENV: &str = "SOLARA_USER_ID";

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_chat_path() -> String {
    "/api/creative_process".to_string()
}

fn default_health_path() -> String {
    "/api/health".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_validity_secs() -> u64 {
    crate::availability::DEFAULT_VALIDITY_SECS
}

fn default_sentinel_input() -> String {
    "health_check".to_string()
}

fn default_sentinel_user() -> String {
    "system".to_string()
}

fn default_health_context() -> DialogueContext {
    DialogueContext::SystemHealthCheck
}

// ── Sections ─────────────────────────────────────────────────────

/// Where the remote creative-process endpoint lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EndpointConfig {
    /// Scheme + host, no trailing path (e.g. `https://agent.example.com`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
    /// Only used by the `dedicated` health strategy.
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_path: default_chat_path(),
            health_path: default_health_path(),
        }
    }
}

impl EndpointConfig {
    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.chat_path)
    }

    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Retry loop parameters for chat requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RetryConfig {
    /// Total attempts per message, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Bound on a single attempt.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Upper bound on one `send` call.
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_attempts.max(1);
        self.request_timeout() * attempts + self.delay() * (attempts - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CacheConfig {
    /// How long an availability reading stays authoritative.
    #[serde(default = "default_validity_secs")]
    pub validity_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            validity_secs: default_validity_secs(),
        }
    }
}

impl CacheConfig {
    pub fn validity(&self) -> Duration {
        Duration::from_secs(self.validity_secs)
    }
}

/// How the endpoint's health is probed and judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HealthConfig {
    #[serde(default)]
    pub strategy: HealthStrategy,
    #[serde(default)]
    pub signal: HealthSignal,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Input sent by the `echo` strategy.
    #[serde(default = "default_sentinel_input")]
    pub sentinel_input: String,
    /// User id sent by the `echo` strategy.
    #[serde(default = "default_sentinel_user")]
    pub sentinel_user: String,
    /// Context sent by the `echo` strategy.
    #[serde(default = "default_health_context")]
    pub context: DialogueContext,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            strategy: HealthStrategy::default(),
            signal: HealthSignal::default(),
            timeout_secs: default_timeout_secs(),
            sentinel_input: default_sentinel_input(),
            sentinel_user: default_sentinel_user(),
            context: default_health_context(),
        }
    }
}

impl HealthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Root ─────────────────────────────────────────────────────────

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// User id attached to chat requests when the caller gives none.
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub health: HealthConfig,
    /// File this config was read from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_user_id: default_user_id(),
            endpoint: EndpointConfig::default(),
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
            health: HealthConfig::default(),
            config_path: None,
        }
    }
}

impl Config {
    /// Resolve, read, override from the environment and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty()) {
                Some(path) => Self::load_from_path(Path::new(&path))?,
                None => match default_config_path() {
                    Some(path) if path.exists() => Self::load_from_path(&path)?,
                    _ => {
                        tracing::debug!("No config file found, using defaults");
                        Self::default()
                    }
                },
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. The file must exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply env-style overrides through `lookup` (`std::env::var` in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.endpoint.base_url = url.trim().to_string();
        }
        if let Some(user) = lookup(USER_ID_ENV).filter(|v| !v.trim().is_empty()) {
            self.default_user_id = user.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.endpoint.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("endpoint.base_url must start with http:// or https:// (got {url:?})");
        }
        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        if self.retry.request_timeout_secs == 0 {
            anyhow::bail!("retry.request_timeout_secs must be at least 1");
        }
        if self.health.timeout_secs == 0 {
            anyhow::bail!("health.timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// JSON schema of the config file, pretty-printed.
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

/// `<platform config dir>/solara-bridge/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "solara-bridge")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
