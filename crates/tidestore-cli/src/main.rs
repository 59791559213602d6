//! Tidestore CLI - client for a tidestore cluster
//!
//! Provides commands for:
//! - Uploading local files into the store
//! - Downloading files back to disk
//! - Deleting files
//! - Inspecting a file's directory record

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    delete::DeleteCommand, download::DownloadCommand, stat::StatCommand, upload::UploadCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "tidestore", version, about = "Block-level file store client")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a local file under its base name
    Upload(UploadCommand),
    /// Download a file to disk
    Download(DownloadCommand),
    /// Delete a file from the store
    Delete(DeleteCommand),
    /// Show a file's version and block layout
    Stat(StatCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Upload(cmd) => cmd.execute(format, cli.quiet, config).await,
        Commands::Download(cmd) => cmd.execute(format, cli.quiet, config).await,
        Commands::Delete(cmd) => cmd.execute(format, cli.quiet, config).await,
        Commands::Stat(cmd) => cmd.execute(format, cli.quiet, config).await,
    }
}
