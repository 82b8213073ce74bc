//! Companion-process launch handshake.
//!
//! The agent asks an external dispatcher service to join a companion (avatar)
//! process into the room. Fire and forget: a failed handshake is logged at
//! warn and never propagated, so the agent serves the protocol regardless.

use std::time::Duration;

use serde::Serialize;

use crate::types::{AgentError, AgentResult};

/// Body of one launch request.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchRequest {
    /// Room the companion should join.
    pub room_name: String,
    /// Media server URL.
    pub url: String,
    /// Pre-minted join token for the companion identity.
    pub token: String,
}

/// Client for the companion dispatcher endpoint.
pub struct CompanionLauncher {
    client: reqwest::Client,
    dispatcher_url: String,
}

impl CompanionLauncher {
    /// Build a launcher against `dispatcher_url` with a request timeout.
    pub fn new(dispatcher_url: impl Into<String>, timeout: Duration) -> AgentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Launcher(e.to_string()))?;
        Ok(Self {
            client,
            dispatcher_url: dispatcher_url.into(),
        })
    }

    /// POST the launch request. Failures are logged and swallowed.
    pub async fn launch(&self, request: &LaunchRequest) {
        tracing::info!("requesting companion join via {}", self.dispatcher_url);
        match self
            .client
            .post(&self.dispatcher_url)
            .json(request)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::info!("companion dispatcher handshake completed");
            }
            Ok(response) => {
                tracing::warn!("companion launch failed: dispatcher returned {}", response.status());
            }
            Err(e) => {
                tracing::warn!("companion launch failed: {e}");
            }
        }
    }
}
