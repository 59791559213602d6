//! Download command - materialize a stored file locally

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tidestore_core::domain::FileName;

use crate::commands::context;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct DownloadCommand {
    /// Name of the file in the store
    pub name: String,

    /// Where to write the file (defaults to the store name)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl DownloadCommand {
    pub async fn execute(
        &self,
        format: OutputFormat,
        quiet: bool,
        config: Option<&str>,
    ) -> Result<()> {
        let formatter = get_formatter(format, quiet);

        let name = match FileName::new(self.name.clone()) {
            Ok(name) => name,
            Err(e) => {
                formatter.error(&e.to_string());
                return Ok(());
            }
        };

        let engine = context::build(config)?;
        let dest = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.name));

        let outcome = match engine.download(&name, &dest).await {
            Ok(outcome) => outcome,
            Err(e) => {
                formatter.error(&e.to_string());
                return Ok(());
            }
        };

        if format == OutputFormat::Json {
            formatter.print_json(&serde_json::json!({
                "file": self.name,
                "output": dest,
                "version": outcome.version,
                "bytes": outcome.bytes_written,
                "blocks_fetched": outcome.blocks_fetched,
                "blocks_reused": outcome.blocks_reused,
            }));
        } else {
            formatter.success(&format!(
                "Downloaded {} (version {}) to {}",
                self.name,
                outcome.version,
                dest.display()
            ));
            formatter.info(&format!(
                "{} bytes, {} blocks fetched, {} reused locally",
                outcome.bytes_written, outcome.blocks_fetched, outcome.blocks_reused
            ));
        }

        Ok(())
    }
}
