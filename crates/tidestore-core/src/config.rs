//! Configuration module for tidestore.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.
//! One file describes the whole cluster; every process reads the same shard
//! list, so shard indexes agree everywhere.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for tidestore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub cluster: ClusterConfig,
    pub placement: PlacementConfig,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
}

/// Cluster topology: where the directory and the block shards listen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// `host:port` of the metadata directory server.
    pub directory: String,
    /// `host:port` of each block shard. Position in this list is the shard
    /// index recorded in file entries, so the order must match everywhere.
    pub shards: Vec<String>,
}

/// Block placement settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Placement strategy: `hash` (deterministic) or `nearest` (latency probe).
    pub strategy: String,
}

/// Conflict retry settings for the reconciliation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of submit attempts before giving up on an operation.
    pub max_attempts: u32,
    /// Delay before the first re-read, doubled after each further conflict.
    pub base_delay_ms: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/tidestore/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("tidestore")
            .join("config.yaml")
    }
}

impl ClusterConfig {
    /// Number of configured shards.
    #[must_use]
    pub fn shard_count(&self) -> u32 {
        self.shards.len() as u32
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

// Config derives Default because all its fields implement Default.
// (clippy::derivable_impls)

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            directory: "127.0.0.1:6000".to_string(),
            shards: vec!["127.0.0.1:7000".to_string(), "127.0.0.1:7001".to_string()],
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            strategy: "hash".to_string(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 50,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"retry.max_attempts"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `placement.strategy`.
const VALID_PLACEMENT_STRATEGIES: &[&str] = &["hash", "nearest"];

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Check that `addr` looks like `host:port` with a usable port.
///
/// Host names are allowed; resolution happens at connect time.
fn is_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && port.parse::<u16>().map(|p| p > 0).unwrap_or(false)
        }
        None => false,
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- cluster ---
        if !is_host_port(&self.cluster.directory) {
            errors.push(ValidationError {
                field: "cluster.directory".into(),
                message: format!("not a host:port address: '{}'", self.cluster.directory),
            });
        }

        if self.cluster.shards.is_empty() {
            errors.push(ValidationError {
                field: "cluster.shards".into(),
                message: "at least one shard is required".into(),
            });
        }

        for (i, shard) in self.cluster.shards.iter().enumerate() {
            if !is_host_port(shard) {
                errors.push(ValidationError {
                    field: format!("cluster.shards[{i}]"),
                    message: format!("not a host:port address: '{shard}'"),
                });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for shard in &self.cluster.shards {
            if !seen.insert(shard.as_str()) {
                errors.push(ValidationError {
                    field: "cluster.shards".into(),
                    message: format!("duplicate shard endpoint: '{shard}'"),
                });
            }
        }

        if self
            .cluster
            .shards
            .iter()
            .any(|s| s == &self.cluster.directory)
        {
            errors.push(ValidationError {
                field: "cluster.shards".into(),
                message: format!(
                    "shard endpoint collides with cluster.directory: '{}'",
                    self.cluster.directory
                ),
            });
        }

        // --- placement ---
        if !VALID_PLACEMENT_STRATEGIES.contains(&self.placement.strategy.as_str()) {
            errors.push(ValidationError {
                field: "placement.strategy".into(),
                message: format!(
                    "invalid strategy '{}'; valid options: {}",
                    self.placement.strategy,
                    VALID_PLACEMENT_STRATEGIES.join(", ")
                ),
            });
        }

        // --- retry ---
        if self.retry.max_attempts == 0 {
            errors.push(ValidationError {
                field: "retry.max_attempts".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.retry.base_delay_ms == 0 {
            errors.push(ValidationError {
                field: "retry.base_delay_ms".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use tidestore_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .cluster_directory("10.0.0.5:6000")
///     .cluster_shards(vec!["10.0.0.6:7000".into(), "10.0.0.7:7000".into()])
///     .placement_strategy("nearest")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- cluster ---

    pub fn cluster_directory(mut self, addr: impl Into<String>) -> Self {
        self.config.cluster.directory = addr.into();
        self
    }

    pub fn cluster_shards(mut self, shards: Vec<String>) -> Self {
        self.config.cluster.shards = shards;
        self
    }

    pub fn add_shard(mut self, addr: impl Into<String>) -> Self {
        self.config.cluster.shards.push(addr.into());
        self
    }

    // --- placement ---

    pub fn placement_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.config.placement.strategy = strategy.into();
        self
    }

    // --- retry ---

    pub fn retry_max_attempts(mut self, n: u32) -> Self {
        self.config.retry.max_attempts = n;
        self
    }

    pub fn retry_base_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry.base_delay_ms = ms;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
