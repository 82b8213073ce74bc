//! Agent error types.

use thiserror::Error;

use uiblocks_proto::types::ProtoError;

/// Result alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors surfaced by the agent runtime.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Wire-level encode or decode failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtoError),

    /// The transport failed to deliver a message.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration loading or validation failure.
    #[error("config error: {0}")]
    Config(String),

    /// Companion launcher setup failure.
    #[error("launcher error: {0}")]
    Launcher(String),

    /// Tool execution fault.
    #[error("tool error: {0}")]
    Tool(String),

    /// Filesystem or stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
