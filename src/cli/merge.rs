//! Merge command: copy home-row-mod bindings from one layout into another.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::Config;
use crate::services::merge::{merge, MergeReport, MergeRequest};
use crate::services::naming::NamingScheme;
use crate::services::DocumentService;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Copy bindings (and everything they depend on) between layouts
#[derive(Debug, Clone, Args)]
pub struct MergeArgs {
    /// Layout to copy bindings from
    #[arg(long, value_name = "FILE")]
    pub source: PathBuf,

    /// Layout to copy bindings into (never modified)
    #[arg(long, value_name = "FILE")]
    pub target: PathBuf,

    /// Layer of the source layout holding the bindings
    #[arg(long, value_name = "LAYER")]
    pub src_layer: String,

    /// Layer of the target layout receiving the bindings
    #[arg(long, value_name = "LAYER")]
    pub dst_layer: String,

    /// Behavior to copy (repeat for multiple, leading '&' optional)
    #[arg(long = "value", value_name = "NAME", required = true)]
    pub values: Vec<String>,

    /// Output path (defaults to <target stem><merge.output_suffix><ext>)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Naming scheme for copied behaviors (defaults to merge.scheme)
    #[arg(long, value_enum)]
    pub scheme: Option<NamingScheme>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for a merge
#[derive(Debug, Serialize)]
struct MergeResponse<'a> {
    output: String,
    #[serde(flatten)]
    report: &'a MergeReport,
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

impl MergeArgs {
    /// Execute the merge command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let output = self.output.clone().unwrap_or_else(|| {
            DocumentService::derived_output_path(&self.target, &config.merge.output_suffix)
        });
        if same_file(&output, &self.source) || same_file(&output, &self.target) {
            return Err(CliError::validation(format!(
                "Refusing to overwrite an input file: {}",
                output.display()
            )));
        }

        let source = DocumentService::load(&self.source)
            .map_err(|e| CliError::io(format!("{e:#}")))?;
        let target = DocumentService::load(&self.target)
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        let request = MergeRequest {
            src_layer: self.src_layer.clone(),
            dst_layer: self.dst_layer.clone(),
            values: self.values.clone(),
            scheme: self.scheme.unwrap_or(config.merge.scheme),
        };
        let report = merge(&source, &target, &request, &config.merge_options())?;

        DocumentService::save(&report.document, &output)
            .map_err(|e| CliError::io(format!("{e:#}")))?;
        info!("Wrote merged layout to {}", output.display());

        if self.json {
            return print_json(&MergeResponse {
                output: output.display().to_string(),
                report: &report,
            });
        }

        println!(
            "Copied {} bindings from '{}' to '{}' into {}.",
            report.positions.len(),
            report.src_layer,
            report.dst_layer,
            output.display()
        );
        if !report.behaviors_added.is_empty() {
            println!(
                "Included {} behavior definitions: {}",
                report.behaviors_added.len(),
                report.behaviors_added.join(", ")
            );
        }
        if !report.behaviors_skipped.is_empty() {
            println!(
                "Already present: {}",
                report.behaviors_skipped.join(", ")
            );
        }
        if !report.layers_added.is_empty() {
            println!("Added layers: {}", report.layers_added.join(", "));
        }
        if !report.layers_reused.is_empty() {
            println!("Reused layers: {}", report.layers_reused.join(", "));
        }
        for (old, new) in &report.renamed {
            println!("  {old} -> {new}");
        }

        Ok(())
    }
}
