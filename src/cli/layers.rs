//! Layer restructuring commands: insert-layer, swap-layers, remove-layer.
//!
//! All three rewrite layer references document-wide and default to writing
//! back to the input file.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::models::Document;
use crate::services::layer_ops::{insert_hrm_layer, remove_named_layer, swap_base_layers};
use crate::services::DocumentService;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

fn load(path: &Path) -> CliResult<Document> {
    DocumentService::load(path).map_err(|e| CliError::io(format!("{e:#}")))
}

fn save(document: &Document, input: &Path, output: Option<&PathBuf>) -> CliResult<PathBuf> {
    let output = output.cloned().unwrap_or_else(|| input.to_path_buf());
    DocumentService::save(document, &output).map_err(|e| CliError::io(format!("{e:#}")))?;
    info!("Wrote layout to {}", output.display());
    Ok(output)
}

/// Move home-row mods from a base layer onto a dedicated layer
#[derive(Debug, Clone, Args)]
pub struct InsertLayerArgs {
    /// Layout to edit
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output path (defaults to overwriting the input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Layer currently holding the home-row mods
    #[arg(long, value_name = "LAYER", default_value = "Base")]
    pub base: String,

    /// Layer holding the plain keys to restore on the base layer
    #[arg(long, value_name = "LAYER", default_value = "Original")]
    pub original: String,

    /// Name of the new layer
    #[arg(long, value_name = "LAYER", default_value = "HRM")]
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InsertLayerArgs {
    /// Execute the insert-layer command
    pub fn execute(&self) -> CliResult<()> {
        let mut document = load(&self.input)?;
        let report = insert_hrm_layer(&mut document, &self.base, &self.original, &self.name)?;
        let output = save(&document, &self.input, self.output.as_ref())?;

        if self.json {
            return print_json(&report);
        }
        println!(
            "Inserted layer '{}' at index {} with {} bindings from '{}' into {}.",
            report.layer,
            report.index,
            report.positions.len(),
            self.base,
            output.display()
        );
        Ok(())
    }
}

/// Promote a modded base layer and keep the old base as fallback
#[derive(Debug, Clone, Args)]
pub struct SwapLayersArgs {
    /// Layout to edit
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output path (defaults to overwriting the input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Current base layer
    #[arg(long, value_name = "LAYER", default_value = "Base")]
    pub base: String,

    /// Layer to promote
    #[arg(long, value_name = "LAYER", default_value = "BaseModded")]
    pub modded: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SwapLayersArgs {
    /// Execute the swap-layers command
    pub fn execute(&self) -> CliResult<()> {
        let mut document = load(&self.input)?;
        let report = swap_base_layers(&mut document, &self.base, &self.modded)?;
        let output = save(&document, &self.input, self.output.as_ref())?;

        if self.json {
            return print_json(&report);
        }
        println!(
            "Swapped '{}' (now layer {}) and '{}' (now layer {}), filled {} keys, into {}.",
            self.modded,
            report.modded_index,
            self.base,
            report.base_index,
            report.filled.len(),
            output.display()
        );
        Ok(())
    }
}

/// Remove a layer and shift every reference
#[derive(Debug, Clone, Args)]
pub struct RemoveLayerArgs {
    /// Layout to edit
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output path (defaults to overwriting the input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Layer to remove
    #[arg(long, value_name = "LAYER")]
    pub layer: String,

    /// Layer that references to the removed layer should point at
    #[arg(long, value_name = "LAYER")]
    pub redirect: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for remove-layer
#[derive(Debug, Serialize)]
struct RemoveResponse {
    layer: String,
    index: usize,
    redirect: Option<String>,
    output: String,
}

impl RemoveLayerArgs {
    /// Execute the remove-layer command
    pub fn execute(&self) -> CliResult<()> {
        let mut document = load(&self.input)?;
        let index = remove_named_layer(&mut document, &self.layer, self.redirect.as_deref())?;
        let output = save(&document, &self.input, self.output.as_ref())?;

        if self.json {
            return print_json(&RemoveResponse {
                layer: self.layer.clone(),
                index,
                redirect: self.redirect.clone(),
                output: output.display().to_string(),
            });
        }
        println!(
            "Removed layer '{}' (index {}) into {}.",
            self.layer,
            index,
            output.display()
        );
        Ok(())
    }
}
