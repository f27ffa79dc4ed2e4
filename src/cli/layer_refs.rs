//! Layer references command for displaying inbound layer references and transparency warnings.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::models::Document;
use crate::services::layer_refs::{build_layer_ref_index, check_transparency_conflict, LayerRef};
use crate::services::DocumentService;
use clap::Args;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Show layer references and transparency warnings
#[derive(Debug, Clone, Args)]
pub struct LayerRefsArgs {
    /// Path to layout JSON file
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for layer references
#[derive(Debug, Serialize)]
struct LayerRefsResponse {
    layers: Vec<LayerRefData>,
}

/// Layer reference data for JSON output
#[derive(Debug, Serialize)]
struct LayerRefData {
    number: usize,
    name: String,
    inbound_refs: Vec<InboundRefData>,
    warnings: Vec<WarningData>,
}

/// Individual inbound reference for JSON output
#[derive(Debug, Serialize)]
struct InboundRefData {
    from_layer: usize,
    position: usize,
    kind: String,
    binding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    via: Option<String>,
}

/// Warning data for JSON output
#[derive(Debug, Serialize)]
struct WarningData {
    position: usize,
    message: String,
}

/// Transparency warnings of one layer, one per conflicting position.
fn layer_warnings(
    document: &Document,
    layer_idx: usize,
    index: &HashMap<usize, Vec<LayerRef>>,
) -> Vec<WarningData> {
    let mut positions: Vec<usize> = index
        .get(&layer_idx)
        .map(|refs| refs.iter().map(|r| r.position).collect())
        .unwrap_or_default();
    positions.sort_unstable();
    positions.dedup();

    positions
        .into_iter()
        .filter_map(|position| {
            let binding = document.layers[layer_idx].get(position)?;
            check_transparency_conflict(layer_idx, position, binding, index)
                .map(|message| WarningData { position, message })
        })
        .collect()
}

impl LayerRefsArgs {
    /// Execute the layer-refs command
    pub fn execute(&self) -> CliResult<()> {
        let document = DocumentService::load(&self.input)
            .map_err(|e| CliError::io(format!("Failed to load layout: {e:#}")))?;

        let layer_ref_index = build_layer_ref_index(&document);

        if self.json {
            let layers = document
                .layer_names
                .iter()
                .enumerate()
                .map(|(layer_idx, name)| LayerRefData {
                    number: layer_idx,
                    name: name.clone(),
                    inbound_refs: layer_ref_index
                        .get(&layer_idx)
                        .map(|refs| {
                            refs.iter()
                                .map(|r| InboundRefData {
                                    from_layer: r.from_layer,
                                    position: r.position,
                                    kind: r.kind.display_name().to_string(),
                                    binding: r.binding.clone(),
                                    via: r.via.clone(),
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                    warnings: layer_warnings(&document, layer_idx, &layer_ref_index),
                })
                .collect();

            return print_json(&LayerRefsResponse { layers });
        }

        for (layer_idx, name) in document.layer_names.iter().enumerate() {
            println!("Layer {layer_idx}: {name}");

            match layer_ref_index.get(&layer_idx) {
                Some(refs) if !refs.is_empty() => {
                    println!("  Inbound References:");
                    for r in refs {
                        let via = r
                            .via
                            .as_ref()
                            .map(|name| format!(" via {name}"))
                            .unwrap_or_default();
                        println!(
                            "    - Layer {} [{}] {}: {}{}",
                            r.from_layer,
                            r.position,
                            r.kind.display_name(),
                            r.binding,
                            via
                        );
                    }
                }
                _ => println!("  No inbound references"),
            }

            let warnings = layer_warnings(&document, layer_idx, &layer_ref_index);
            if !warnings.is_empty() {
                println!("  Warnings:");
                for warning in warnings {
                    println!("    - Position [{}]: {}", warning.position, warning.message);
                }
            }

            println!();
        }

        Ok(())
    }
}
