//! UI Blocks v2 agent entry point.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use uiblocks_agent::config::load_config;
use uiblocks_agent::content::welcome_payload;
use uiblocks_agent::launcher::{CompanionLauncher, LaunchRequest};
use uiblocks_agent::protocol::CallLimits;
use uiblocks_agent::{
    AgentConfig, CallRegistry, EventDispatcher, OutboundSender, StdioTransport, ToolRegistry,
};
use uiblocks_proto::codec::{PROTOCOL_VERSION, SCHEMA_UI_BLOCKS, TOPIC_UI_BLOCKS, TOPIC_UI_EVENTS};

#[derive(Parser)]
#[command(
    name = "uiblocks-agent",
    about = "Voice-room agent serving the UI Blocks v2 interaction protocol",
    version
)]
struct Cli {
    /// Configuration file path.
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the protocol over stdio framing (default).
    Serve {
        /// Room name forwarded to the companion dispatcher.
        #[arg(long)]
        room: Option<String>,

        /// Media server URL forwarded to the companion dispatcher.
        #[arg(long)]
        url: Option<String>,

        /// Pre-minted join token forwarded to the companion dispatcher.
        #[arg(long)]
        token: Option<String>,

        /// Configuration file path.
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Print protocol and tool information as JSON.
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout carries protocol frames, so logs go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        room: None,
        url: None,
        token: None,
        config: None,
    }) {
        Commands::Serve {
            room,
            url,
            token,
            config,
        } => {
            let config = load_config(config.or(cli.config).as_deref())?;
            serve(config, room, url, token).await?;
        }

        Commands::Info => {
            let config = load_config(cli.config.as_deref())?;
            let tools = ToolRegistry::with_defaults(config.tool_delay()).list_tools();
            let info = serde_json::json!({
                "protocol_version": PROTOCOL_VERSION,
                "schema": SCHEMA_UI_BLOCKS,
                "topics": {
                    "content": TOPIC_UI_BLOCKS,
                    "events": TOPIC_UI_EVENTS,
                },
                "tools": tools,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}

async fn serve(
    config: AgentConfig,
    room: Option<String>,
    url: Option<String>,
    token: Option<String>,
) -> anyhow::Result<()> {
    let transport = StdioTransport::new();
    let sender = OutboundSender::new(transport.clone());
    let registry = Arc::new(CallRegistry::new());
    let tools = Arc::new(ToolRegistry::with_defaults(config.tool_delay()));
    let dispatcher = Arc::new(
        EventDispatcher::new(Arc::clone(&registry), Arc::clone(&tools), sender.clone())
            .with_limits(CallLimits {
                max_inflight_calls: config.max_inflight_calls,
                call_timeout: config.call_timeout(),
            }),
    );

    // Companion handshake, only when the caller provided join parameters.
    if let (Some(room), Some(url), Some(token)) = (room, url, token) {
        let launcher = CompanionLauncher::new(&config.dispatcher_url, config.launch_timeout())?;
        launcher
            .launch(&LaunchRequest {
                room_name: room,
                url,
                token,
            })
            .await;
    } else {
        tracing::debug!("no room/url/token given; skipping companion launch");
    }

    // Initial announcement; a failure here is not fatal.
    let welcome = welcome_payload(&tools.list_tools());
    if let Err(e) = sender.send_content(&welcome, None, None).await {
        tracing::warn!("failed to send initial announcement: {e}");
    }

    tracing::info!("serving UI events over stdio");
    tokio::select! {
        result = transport.run(Arc::clone(&dispatcher)) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down; cancelling in-flight calls");
            registry.cancel_all().await;
            registry.join_all().await;
        }
    }

    Ok(())
}
