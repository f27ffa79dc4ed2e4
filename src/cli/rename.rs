//! Rename command: apply the naming scheme to a whole layout.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::Config;
use crate::services::naming::NamingScheme;
use crate::services::rename::RenamePlan;
use crate::services::DocumentService;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Rename home-row-mod behaviors and every reference to them
#[derive(Debug, Clone, Args)]
pub struct RenameArgs {
    /// Layout to rename behaviors in
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output path (defaults to overwriting the input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Naming scheme (defaults to merge.scheme)
    #[arg(long, value_enum)]
    pub scheme: Option<NamingScheme>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for a rename
#[derive(Debug, Serialize)]
struct RenameResponse {
    output: String,
    renamed: Vec<RenamedData>,
}

#[derive(Debug, Serialize)]
struct RenamedData {
    from: String,
    to: String,
}

impl RenameArgs {
    /// Execute the rename command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let mut document = DocumentService::load(&self.input)
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        let scheme = self.scheme.unwrap_or(config.merge.scheme);
        let plan = RenamePlan::for_document(&document, scheme)?
            .with_description_suffixes(config.rename.strip_suffixes.clone());
        plan.apply_to_document(&mut document)?;
        if config.merge.sort_behaviors {
            document.sort_behaviors();
        }

        let output = self.output.clone().unwrap_or_else(|| self.input.clone());
        DocumentService::save(&document, &output)
            .map_err(|e| CliError::io(format!("{e:#}")))?;
        info!("Wrote renamed layout to {}", output.display());

        if self.json {
            return print_json(&RenameResponse {
                output: output.display().to_string(),
                renamed: plan
                    .changes()
                    .map(|(from, to)| RenamedData {
                        from: from.to_string(),
                        to: to.to_string(),
                    })
                    .collect(),
            });
        }

        if plan.is_empty() {
            println!("No behaviors to rename in {}.", self.input.display());
        } else {
            println!(
                "Renamed {} behaviors into {}:",
                plan.changes().count(),
                output.display()
            );
            for (from, to) in plan.changes() {
                println!("  {from} -> {to}");
            }
        }

        Ok(())
    }
}
