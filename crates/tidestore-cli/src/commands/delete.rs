//! Delete command - tombstone a file in the directory

use anyhow::Result;
use clap::Args;
use tidestore_core::domain::FileName;

use crate::commands::context;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Name of the file in the store
    pub name: String,
}

impl DeleteCommand {
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

        let outcome = match engine.delete(&name).await {
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
                "attempts": outcome.attempts,
            }));
        } else {
            formatter.success(&format!(
                "Deleted {} (tombstone version {})",
                self.name, outcome.version
            ));
            if outcome.attempts > 1 {
                formatter.info(&format!("Attempts: {} (contended)", outcome.attempts));
            }
        }

        Ok(())
    }
}
