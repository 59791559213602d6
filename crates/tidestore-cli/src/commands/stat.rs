//! Stat command - inspect a file's directory record

use anyhow::Result;
use clap::Args;
use tidestore_core::domain::FileName;

use crate::commands::context;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct StatCommand {
    /// Name of the file in the store
    pub name: String,
}

impl StatCommand {
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

        let outcome = match engine.stat(&name).await {
            Ok(outcome) => outcome,
            Err(e) => {
                formatter.error(&e.to_string());
                return Ok(());
            }
        };

        if format == OutputFormat::Json {
            formatter.print_json(&serde_json::json!({
                "file": self.name,
                "version": outcome.version,
                "blocks": outcome.blocks_total,
                "tombstone": outcome.tombstone,
            }));
        } else if outcome.tombstone {
            formatter.success(&format!(
                "{}: deleted at version {}",
                self.name, outcome.version
            ));
        } else {
            formatter.success(&format!(
                "{}: version {}, {} block(s)",
                self.name, outcome.version, outcome.blocks_total
            ));
        }

        Ok(())
    }
}
