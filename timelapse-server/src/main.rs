mod config;
mod error;
mod projection;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use timelapse_core::{NetworkConfig, NetworkGraph, create_network_document, create_network_graph};
use tracing_subscriber::EnvFilter;

use crate::config::{NetworkSource, ServerConfig};
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "timelapse-server", version, about = "Serve transit vehicle animation data")]
struct Cli {
    /// Server configuration file
    #[arg(short, long, default_value = "timelapse.toml")]
    config: PathBuf,

    /// Override the listen address from the config file
    #[arg(long)]
    listen: Option<SocketAddr>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Build a network document from GTFS feeds and write it as JSON
    Build {
        /// GTFS feed directories
        #[arg(long = "gtfs", required = true)]
        gtfs_dirs: Vec<PathBuf>,
        /// Output document path
        #[arg(short, long)]
        output: PathBuf,
        /// Keep pass-through junctions instead of merging them
        #[arg(long)]
        no_coalesce: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Build {
            gtfs_dirs,
            output,
            no_coalesce,
        }) => {
            init_tracing("info");
            let config = NetworkConfig {
                gtfs_dirs,
                coalesce: !no_coalesce,
            };
            let document =
                tokio::task::spawn_blocking(move || create_network_document(&config)).await??;
            std::fs::write(&output, document.to_json_string()?)?;
            tracing::info!(path = %output.display(), "Wrote network document");
            Ok(())
        }
        None | Some(Command::Serve) => {
            let mut config = ServerConfig::from_path(&cli.config)?;
            if let Some(listen) = cli.listen {
                config.listen = listen;
            }
            init_tracing(&config.log_level);
            serve(config).await
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // Also installs the bridge for `log` records emitted by the engine
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source = config.network.source()?;
    let graph = tokio::task::spawn_blocking(move || load_graph(source)).await??;
    let state = Arc::new(AppState::new(graph)?);

    let app = routes::create_router(
        state,
        config.request_timeout(),
        config.max_concurrent_requests,
    );
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

fn load_graph(source: NetworkSource) -> Result<NetworkGraph, timelapse_core::Error> {
    match source {
        NetworkSource::Document(path) => {
            tracing::info!(path = %path.display(), "Loading network document");
            NetworkGraph::from_path(&path)
        }
        NetworkSource::Gtfs(config) => create_network_graph(&config),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
