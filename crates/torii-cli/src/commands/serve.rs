//! `torii serve` command.
//!
//! Starts the MCP server over the configured transport, binding the
//! bundled echo toolbox as the handler.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Args;

use torii_config::{validate, ToriiConfig, TransportSelect};
use torii_dispatch::{Dispatcher, DispatcherConfig};
use torii_session::SessionRegistry;
use torii_transport_sse::{SseServer, SseState, SseTransportConfig};
use torii_transport_stdio::StdioServer;

use crate::toolbox::EchoToolbox;

/// Start the MCP server.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Transport to serve on (overrides config).
    #[arg(long, value_parser = ["sse", "stdio"])]
    pub transport: Option<String>,
    /// Bind host for the SSE transport (overrides config).
    #[arg(long)]
    pub host: Option<String>,
    /// Bind port for the SSE transport (overrides config).
    #[arg(long)]
    pub port: Option<u16>,
    /// URL prefix for /sse and /rpc/... (overrides config).
    #[arg(long)]
    pub prefix: Option<String>,
    /// Expose the tools/register extension.
    #[arg(long)]
    pub tools_register: bool,
}

/// Executes the serve command.
pub async fn execute(args: &ServeArgs, mut config: ToriiConfig) -> anyhow::Result<()> {
    if let Some(transport) = &args.transport {
        config.server.transport = match transport.as_str() {
            "stdio" => TransportSelect::Stdio,
            _ => TransportSelect::Sse,
        };
    }
    if let Some(host) = &args.host {
        config.server.bind_host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.bind_port = port;
    }
    if let Some(prefix) = &args.prefix {
        config.server.path_prefix = prefix.clone();
    }
    if args.tools_register {
        config.server.tools_register_enabled = true;
    }
    validate(&config)?;

    let registry = SessionRegistry::new();
    let dispatcher = Dispatcher::new(
        registry.clone(),
        Arc::new(EchoToolbox::new()),
        DispatcherConfig {
            supported_versions: config.server.supported_versions.clone(),
            tools_register_enabled: config.server.tools_register_enabled,
        },
    );

    match config.server.transport {
        TransportSelect::Stdio => {
            let server =
                StdioServer::new(tokio::io::stdin(), tokio::io::stdout(), registry);
            server
                .run(dispatcher)
                .await
                .map_err(|e| anyhow::anyhow!("server error: {e}"))
        }
        TransportSelect::Sse => {
            let addr: SocketAddr =
                format!("{}:{}", config.server.bind_host, config.server.bind_port)
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid bind address: {e}"))?;
            let state = SseState {
                registry,
                dispatcher,
                config: SseTransportConfig {
                    path_prefix: config.server.path_prefix.clone(),
                    idle_timeout: config.server.sse_idle_timeout(),
                    expose_health: config.server.mode.exposes_health(),
                },
            };
            SseServer::new(addr, state)
                .run()
                .await
                .map_err(|e| anyhow::anyhow!("server error: {e}"))
        }
    }
}
