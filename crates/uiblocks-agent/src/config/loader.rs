//! TOML configuration with environment overrides.

use std::time::Duration;

use serde::Deserialize;

use crate::types::{AgentError, AgentResult};

/// Default companion dispatcher endpoint.
const DEFAULT_DISPATCHER_URL: &str = "http://localhost:8089/launch";
/// Default launch handshake timeout, in seconds.
const DEFAULT_LAUNCH_TIMEOUT_SECS: u64 = 10;
/// Default simulated work delay for the sample tools, in milliseconds.
const DEFAULT_TOOL_DELAY_MS: u64 = 300;

/// Agent configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Companion dispatcher endpoint.
    pub dispatcher_url: String,
    /// Launch handshake timeout in seconds.
    pub launch_timeout_secs: u64,
    /// Simulated work delay for the sample tools, in milliseconds.
    pub tool_delay_ms: u64,
    /// Optional bound on concurrently running calls. Off by default.
    pub max_inflight_calls: Option<usize>,
    /// Optional per-call timeout in seconds. Off by default. A timed-out
    /// call terminates through its cancellation path.
    pub call_timeout_secs: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            dispatcher_url: DEFAULT_DISPATCHER_URL.to_string(),
            launch_timeout_secs: DEFAULT_LAUNCH_TIMEOUT_SECS,
            tool_delay_ms: DEFAULT_TOOL_DELAY_MS,
            max_inflight_calls: None,
            call_timeout_secs: None,
        }
    }
}

impl AgentConfig {
    /// Simulated work delay for the sample tools.
    pub fn tool_delay(&self) -> Duration {
        Duration::from_millis(self.tool_delay_ms)
    }

    /// Launch handshake timeout.
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    /// Per-call timeout, when configured.
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

/// Load configuration: defaults, then the TOML file when given, then
/// environment overrides (`AVATAR_DISPATCHER_URL`).
pub fn load_config(path: Option<&str>) -> AgentResult<AgentConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            toml::from_str(&text)
                .map_err(|e| AgentError::Config(format!("failed to parse {path}: {e}")))?
        }
        None => AgentConfig::default(),
    };

    if let Ok(url) = std::env::var("AVATAR_DISPATCHER_URL") {
        if !url.is_empty() {
            config.dispatcher_url = url;
        }
    }

    Ok(config)
}
