//! tidestore-blockstore - content-addressed block shard server
//!
//! Serves one shard slot from the cluster configuration. Run one
//! instance per entry in `cluster.shards`, selecting the slot with
//! `--index` (or overriding the address entirely with `--listen`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tidestore_blockstore::{BlockShardServer, BlockStore};
use tidestore_core::config::Config;

#[derive(Parser)]
#[command(name = "tidestore-blockstore")]
#[command(about = "Tidestore block shard server")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which entry of `cluster.shards` this instance serves
    #[arg(short, long, default_value_t = 0)]
    index: u32,

    /// Listen address, overriding the configured shard entry
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

    let endpoint = match cli.listen {
        Some(listen) => listen,
        None => config
            .cluster
            .shards
            .get(cli.index as usize)
            .cloned()
            .with_context(|| {
                format!(
                    "Shard index {} out of range ({} shard(s) configured)",
                    cli.index,
                    config.cluster.shards.len()
                )
            })?,
    };

    info!(index = cli.index, endpoint = %endpoint, "Starting block shard");

    let store = Arc::new(BlockStore::new());
    let server = BlockShardServer::bind(store, &endpoint).await?;

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
