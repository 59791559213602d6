//! Shared command setup
//!
//! Every command loads the cluster configuration and wires the same
//! client stack: directory adapter, shard roster, placement strategy,
//! reconciliation engine.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use tidestore_client::{
    DeterministicPlacement, DirectoryClient, NearestShardPlacement, ReconcileEngine, RetryPolicy,
    ShardSet,
};
use tidestore_core::config::Config;
use tidestore_core::ports::IPlacementStrategy;

/// Load configuration, honoring `--config` when given.
pub fn load_config(config_arg: Option<&str>) -> anyhow::Result<Config> {
    let config = match config_arg {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => Config::load_or_default(&Config::default_path()),
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("config error: {e}");
        }
        anyhow::bail!("Invalid configuration ({} problem(s))", errors.len());
    }

    Ok(config)
}

/// Wire a reconciliation engine against the configured cluster.
pub fn engine_from_config(config: &Config) -> anyhow::Result<ReconcileEngine> {
    let set = ShardSet::from_cluster(&config.cluster);
    let directory = Arc::new(DirectoryClient::new(&config.cluster.directory));

    let placement: Arc<dyn IPlacementStrategy> = match config.placement.strategy.as_str() {
        "nearest" => Arc::new(NearestShardPlacement::new(set.clients())),
        _ => Arc::new(DeterministicPlacement::new(set.count())?),
    };

    info!(
        directory = %config.cluster.directory,
        shards = set.count(),
        strategy = %config.placement.strategy,
        "Cluster wired"
    );

    Ok(ReconcileEngine::new(
        directory,
        set.clients(),
        placement,
        RetryPolicy::from_config(&config.retry),
    ))
}

/// Load config and build the engine in one step.
pub fn build(config_arg: Option<&str>) -> anyhow::Result<ReconcileEngine> {
    let config = load_config(config_arg)?;
    engine_from_config(&config)
}
