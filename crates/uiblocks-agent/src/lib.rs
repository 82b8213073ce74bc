//! UI Blocks v2 agent: tool invocation over a topic-addressed text transport.
//!
//! A remote participant invokes named tools with `tool.invoke`, receives
//! streamed `tool.result` progress plus exactly one terminal `tool.result`
//! or `tool.error` per call, and may request cooperative cancellation with
//! `tool.cancel`.

pub mod calls;
pub mod config;
pub mod content;
pub mod launcher;
pub mod outbound;
pub mod protocol;
pub mod tools;
pub mod transport;
pub mod types;

pub use calls::CallRegistry;
pub use config::AgentConfig;
pub use outbound::OutboundSender;
pub use protocol::EventDispatcher;
pub use tools::ToolRegistry;
pub use transport::StdioTransport;
