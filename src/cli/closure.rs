//! Closure command: show what a merge of the given bindings would copy.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::Config;
use crate::services::merge::select;
use crate::services::resolver::ReferenceResolver;
use crate::services::DocumentService;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Show the behaviors and layers the selected bindings depend on
#[derive(Debug, Clone, Args)]
pub struct ClosureArgs {
    /// Layout to inspect
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Layer holding the bindings
    #[arg(long, value_name = "LAYER")]
    pub layer: String,

    /// Behavior to resolve (repeat for multiple, leading '&' optional)
    #[arg(long = "value", value_name = "NAME", required = true)]
    pub values: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for closure
#[derive(Debug, Serialize)]
struct ClosureResponse {
    positions: Vec<usize>,
    behaviors: Vec<String>,
    layers: Vec<LayerData>,
}

#[derive(Debug, Serialize)]
struct LayerData {
    index: usize,
    name: String,
}

impl ClosureArgs {
    /// Execute the closure command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let document = DocumentService::load(&self.input)
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        let selection = select(&document, &self.layer, &self.values)?;
        let builtins = config.builtins();
        let closure =
            ReferenceResolver::new(&document, &builtins).resolve_bindings(&selection.bindings)?;

        let layers: Vec<LayerData> = closure
            .layers
            .iter()
            .map(|&index| LayerData {
                index,
                name: document.layer_name(index).unwrap_or_default().to_string(),
            })
            .collect();

        if self.json {
            return print_json(&ClosureResponse {
                positions: selection.positions,
                behaviors: closure.behaviors,
                layers,
            });
        }

        let positions: Vec<String> = selection.positions.iter().map(ToString::to_string).collect();
        println!("Positions on '{}': {}", self.layer, positions.join(", "));
        println!("Behaviors ({}):", closure.behaviors.len());
        for name in &closure.behaviors {
            let kind = document
                .behavior(name)
                .map(|behavior| behavior.kind_name())
                .unwrap_or_default();
            println!("  {name} ({kind})");
        }
        if layers.is_empty() {
            println!("Layers: none");
        } else {
            println!("Layers ({}):", layers.len());
            for layer in &layers {
                println!("  {}: {}", layer.index, layer.name);
            }
        }

        Ok(())
    }
}
