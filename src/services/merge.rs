//! Copying home-row-mod bindings between layout documents.
//!
//! A merge runs through four stages:
//!
//! 1. **Selecting**: find every position of the source layer that carries one
//!    of the requested behaviors.
//! 2. **Resolving**: compute the closure of behaviors and layers those
//!    bindings depend on.
//! 3. **Renaming**: map every behavior in the closure to its canonical name.
//! 4. **Integrating**: place layers, behaviors and bindings into a copy of the
//!    target document.
//!
//! The target passed in is never modified; the merged document is returned in
//! the [`MergeReport`].

use crate::error::{MergeError, MergeResult};
use crate::models::{Binding, BuiltinBehaviors, Document, LayerParams};
use crate::services::naming::NamingScheme;
use crate::services::reindex;
use crate::services::rename::RenamePlan;
use crate::services::resolver::{Closure, ReferenceResolver};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// What to copy and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Layer of the source document to read bindings from
    pub src_layer: String,
    /// Layer of the target document to write bindings to
    pub dst_layer: String,
    /// Behavior names to copy, leading `&` optional
    pub values: Vec<String>,
    /// Naming scheme applied to copied behaviors
    pub scheme: NamingScheme,
}

/// Settings shared by every merge.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Firmware behaviors that never need copying
    pub builtins: BuiltinBehaviors,
    /// Sort `holdTaps` and `macros` by name in the result
    pub sort_behaviors: bool,
    /// Description suffixes dropped from renamed behaviors
    pub strip_suffixes: Vec<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            builtins: BuiltinBehaviors::default(),
            sort_behaviors: true,
            strip_suffixes: vec![" - TailorKey".to_string()],
        }
    }
}

/// Stage a merge is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStage {
    /// Locating the requested bindings
    Selecting,
    /// Computing the dependency closure
    Resolving,
    /// Building the rename plan
    Renaming,
    /// Writing into the working copy of the target
    Integrating,
    /// Finished
    Merged,
}

impl fmt::Display for MergeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Selecting => "selecting",
            Self::Resolving => "resolving",
            Self::Renaming => "renaming",
            Self::Integrating => "integrating",
            Self::Merged => "merged",
        };
        write!(f, "{name}")
    }
}

/// Positions of the source layer chosen for copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Index of the source layer
    pub layer: usize,
    /// Selected key positions, ascending
    pub positions: Vec<usize>,
    /// Bindings at those positions
    pub bindings: Vec<Binding>,
}

/// Outcome of a successful merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    /// The merged document
    #[serde(skip)]
    pub document: Document,
    /// Source layer name
    pub src_layer: String,
    /// Destination layer name
    pub dst_layer: String,
    /// Key positions written on the destination layer
    pub positions: Vec<usize>,
    /// Behaviors that were renamed, as (old, new)
    pub renamed: Vec<(String, String)>,
    /// Behaviors added to the target
    pub behaviors_added: Vec<String>,
    /// Behaviors already present with an identical definition
    pub behaviors_skipped: Vec<String>,
    /// Layers appended to the target
    pub layers_added: Vec<String>,
    /// Closure layers that already existed in the target
    pub layers_reused: Vec<String>,
}

/// Prefixes `&` to a requested value if it is missing.
pub fn normalize_value(value: &str) -> String {
    let value = value.trim();
    if value.starts_with('&') {
        value.to_string()
    } else {
        format!("&{value}")
    }
}

fn in_stage<T>(stage: MergeStage, run: impl FnOnce() -> MergeResult<T>) -> MergeResult<T> {
    debug!("Merge stage: {}", stage);
    run().map_err(|err| {
        debug!("Merge failed while {}: {}", stage, err);
        err
    })
}

/// Finds every position of `layer` whose binding invokes one of `values`.
///
/// Fails with `BindingNotFound` listing every value that does not occur.
pub fn select(document: &Document, layer: &str, values: &[String]) -> MergeResult<Selection> {
    let index = document.layer_index(layer)?;
    let bindings = &document.layers[index];

    let mut wanted: Vec<String> = Vec::new();
    for value in values {
        let value = normalize_value(value);
        if !wanted.contains(&value) {
            wanted.push(value);
        }
    }

    let missing: Vec<String> = wanted
        .iter()
        .filter(|value| !bindings.iter().any(|binding| &binding.value == *value))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(MergeError::BindingNotFound {
            layer: layer.to_string(),
            missing,
        });
    }

    let (positions, selected) = bindings
        .iter()
        .enumerate()
        .filter(|(_, binding)| wanted.contains(&binding.value))
        .map(|(position, binding)| (position, binding.clone()))
        .unzip();

    Ok(Selection {
        layer: index,
        positions,
        bindings: selected,
    })
}

/// Merges the requested bindings of `source` into a copy of `target`.
pub fn merge(
    source: &Document,
    target: &Document,
    request: &MergeRequest,
    options: &MergeOptions,
) -> MergeResult<MergeReport> {
    let selection = in_stage(MergeStage::Selecting, || {
        let dst_index = target.layer_index(&request.dst_layer)?;
        let selection = select(source, &request.src_layer, &request.values)?;
        let expected = source.layers[selection.layer].len();
        let actual = target.layers[dst_index].len();
        if expected != actual {
            return Err(MergeError::LayerSizeMismatch {
                layer: request.dst_layer.clone(),
                expected,
                actual,
            });
        }
        debug!(
            "Selected {} positions on '{}'",
            selection.positions.len(),
            request.src_layer
        );
        Ok(selection)
    })?;

    // Layers the target already has are reused as they are, so their source
    // bindings pull in nothing.
    let existing_layers: Vec<usize> = source
        .layer_names
        .iter()
        .enumerate()
        .filter(|(_, name)| target.layer_names.contains(name))
        .map(|(index, _)| index)
        .collect();
    let closure = in_stage(MergeStage::Resolving, || {
        ReferenceResolver::new(source, &options.builtins)
            .with_opaque_layers(existing_layers)
            .resolve_bindings(&selection.bindings)
    })?;
    debug!(
        "Closure has {} behaviors and {} layers",
        closure.behaviors.len(),
        closure.layers.len()
    );

    let plan = in_stage(MergeStage::Renaming, || {
        Ok(RenamePlan::build(&closure.behaviors, request.scheme)?
            .with_description_suffixes(options.strip_suffixes.clone()))
    })?;

    let report = in_stage(MergeStage::Integrating, || {
        integrate(source, target, request, options, &selection, &closure, &plan)
    })?;
    debug!("Merge stage: {}", MergeStage::Merged);
    Ok(report)
}

/// Places the closure into a working copy of `target`.
fn integrate(
    source: &Document,
    target: &Document,
    request: &MergeRequest,
    options: &MergeOptions,
    selection: &Selection,
    closure: &Closure,
    plan: &RenamePlan,
) -> MergeResult<MergeReport> {
    let mut working = target.clone();
    let mut layers_added = Vec::new();
    let mut layers_reused = Vec::new();

    // Assign destination indices first so appended layers can point at each other.
    let mut layer_map: BTreeMap<usize, usize> = BTreeMap::new();
    let mut to_append = Vec::new();
    let mut next_index = working.layer_count();
    for &src_index in &closure.layers {
        let name = source.layer_name(src_index).unwrap_or_default();
        if let Ok(existing) = working.layer_index(name) {
            debug!("Reusing layer '{}' at {}", name, existing);
            layer_map.insert(src_index, existing);
            layers_reused.push(name.to_string());
        } else {
            layer_map.insert(src_index, next_index);
            to_append.push(src_index);
            next_index += 1;
        }
    }

    // Layer params are looked up under source names, so remap before renaming.
    let params = LayerParams::of(source);
    let translate = |binding: &Binding, context: &str| -> MergeResult<Binding> {
        let mut binding = binding.clone();
        binding.map_layer_refs(&params, |index| {
            layer_map
                .get(&index)
                .copied()
                .ok_or_else(|| MergeError::DanglingLayerReference {
                    index,
                    context: context.to_string(),
                })
        })?;
        plan.apply_to_binding(&mut binding);
        Ok(binding)
    };

    for src_index in to_append {
        let name = source.layer_name(src_index).unwrap_or_default().to_string();
        let bindings = source.layers[src_index]
            .iter()
            .enumerate()
            .map(|(position, binding)| {
                translate(binding, &format!("layer '{name}' position {position}"))
            })
            .collect::<MergeResult<Vec<_>>>()?;
        let at = working.layer_count();
        reindex::insert_layer(&mut working, at, name.as_str(), bindings)?;
        layers_added.push(name);
    }

    let mut behaviors_added = Vec::new();
    let mut behaviors_skipped = Vec::new();
    for name in &closure.behaviors {
        let mut behavior = source.behavior(name)?;
        let context = format!("{} '{}'", behavior.kind_name(), name);
        behavior.map_layer_refs(&params, |index| {
            layer_map
                .get(&index)
                .copied()
                .ok_or_else(|| MergeError::DanglingLayerReference {
                    index,
                    context: context.clone(),
                })
        })?;
        plan.apply_to_behavior(&mut behavior);

        if working.contains_behavior(behavior.name()) {
            if working.behavior(behavior.name())? == behavior {
                debug!("Behavior {} already present", behavior.name());
                behaviors_skipped.push(behavior.name().to_string());
                continue;
            }
            return Err(MergeError::TargetNameConflict {
                name: behavior.name().to_string(),
            });
        }
        behaviors_added.push(behavior.name().to_string());
        working.add_behavior(behavior)?;
    }

    for (&position, binding) in selection.positions.iter().zip(&selection.bindings) {
        let context = format!("layer '{}' position {}", request.src_layer, position);
        let binding = translate(binding, &context)?;
        working.set_binding(&request.dst_layer, position, binding)?;
    }

    if options.sort_behaviors {
        working.sort_behaviors();
    }

    Ok(MergeReport {
        document: working,
        src_layer: request.src_layer.clone(),
        dst_layer: request.dst_layer.clone(),
        positions: selection.positions.clone(),
        renamed: plan
            .changes()
            .map(|(old, new)| (old.to_string(), new.to_string()))
            .collect(),
        behaviors_added,
        behaviors_skipped,
        layers_added,
        layers_reused,
    })
}
