//! tidestore-directory - authoritative file metadata service
//!
//! Holds the filename -> record table for a cluster and arbitrates
//! concurrent updates through per-file version checks. Exactly one
//! directory instance runs per cluster.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tidestore_core::config::Config;
use tidestore_directory::{DirectoryServer, FileTable};

#[derive(Parser)]
#[command(name = "tidestore-directory")]
#[command(about = "Tidestore metadata directory server")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding `cluster.directory` from the config
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("config error: {e}");
        }
        anyhow::bail!("Invalid configuration ({} problem(s))", errors.len());
    }

    init_tracing(&config.logging.level);

    let endpoint = cli.listen.unwrap_or_else(|| config.cluster.directory.clone());

    let table = Arc::new(FileTable::new());
    let server = DirectoryServer::bind(table, &endpoint).await?;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    server.run(shutdown).await
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            Config::load(path).with_context(|| format!("Failed to load config from {path:?}"))
        }
        None => Ok(Config::load_or_default(&Config::default_path())),
    }
}

fn init_tracing(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves when the process receives SIGINT or SIGTERM, then cancels
/// the token so the accept loop drains.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
    token.cancel();
}
