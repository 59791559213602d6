//! Upload command - push a local file into the store

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::commands::context;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Local file to upload
    pub path: PathBuf,
}

impl UploadCommand {
    pub async fn execute(
        &self,
        format: OutputFormat,
        quiet: bool,
        config: Option<&str>,
    ) -> Result<()> {
        let formatter = get_formatter(format, quiet);
        let engine = context::build(config)?;

        let outcome = match engine.upload(&self.path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                formatter.error(&e.to_string());
                return Ok(());
            }
        };

        if format == OutputFormat::Json {
            formatter.print_json(&serde_json::json!({
                "file": self.path.file_name().and_then(|n| n.to_str()),
                "version": outcome.version,
                "blocks_total": outcome.blocks_total,
                "blocks_pushed": outcome.blocks_pushed,
                "attempts": outcome.attempts,
            }));
        } else {
            formatter.success(&format!(
                "Uploaded {} as version {}",
                self.path.display(),
                outcome.version
            ));
            formatter.info(&format!(
                "Blocks: {} total, {} pushed",
                outcome.blocks_total, outcome.blocks_pushed
            ));
            if outcome.attempts > 1 {
                formatter.info(&format!("Attempts: {} (contended)", outcome.attempts));
            }
        }

        Ok(())
    }
}
