//! Command Gateway (v1)
//!
//! REST front end for a path-keyed command engine.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                  COMMAND GATEWAY                      │
//!                      │                                                       │
//!   GET/POST/PUT/PATCH │  ┌──────────┐   ┌────────────┐   ┌──────────────┐    │
//!   ───────────────────┼─▶│  input   │──▶│   authz    │──▶│   command    │    │
//!                      │  │normalize │   │token+notok.│   │   engine     │    │
//!                      │  └──────────┘   └────────────┘   └──────┬───────┘    │
//!                      │                                          │            │
//!   JSON response      │  ┌──────────┐   ┌────────────┐           │            │
//!   ◀──────────────────┼──│ envelope │◀──│ status map │◀──────────┘            │
//!                      │  └──────────┘   └────────────┘                         │
//!                      │                                                       │
//!                      │  config (hot reload) · tracing · metrics · lifecycle  │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use command_gateway::command::CommandRegistry;
use command_gateway::config::{load_config, watcher::ConfigWatcher, GatewayConfig};
use command_gateway::http::HttpServer;
use command_gateway::lifecycle::{signals, Shutdown};
use command_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "command-gateway", version, about = "REST gateway for the command engine")]
struct Args {
    /// Path to a TOML configuration file (watched for changes).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!("command-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_path = %config.api.base_path,
        users = config.settings.users.len(),
        entities = config.entities.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    if config.settings.notoken_api {
        tracing::warn!("notoken_api is set: every API caller is treated as admin");
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            match watcher.run() {
                Ok(handle) => (Some(handle), updates),
                Err(e) => {
                    tracing::error!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (None, updates)
                }
            }
        }
        None => (None, mpsc::unbounded_channel().1),
    };

    let engine = Arc::new(CommandRegistry::from_config(&config));
    let server = HttpServer::new(config, engine);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
