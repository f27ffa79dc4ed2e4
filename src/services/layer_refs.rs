//! Layer reference tracking and analysis.
//!
//! This module finds every key that activates another layer, either directly
//! (`&mo 3`, `&lt 2 SPACE`), by passing the layer to a hold-tap or macro
//! (`&my_lt 3 SPACE` with hold slot `&mo`), or through a chain of hold-taps and
//! macros (a home-row-mod hold-tap whose hold macro runs `&mo 3`). It is used to:
//! - list the inbound references of each layer
//! - warn when a hold-activated layer has a non-transparent key under the
//!   very key that holds it

use crate::models::{Binding, Document, LayerParams};
use std::collections::{HashMap, HashSet};

/// Type of layer reference (how a key activates another layer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRefKind {
    /// Momentary layer switch while held - `&mo n`
    Momentary,
    /// Layer tap - tap for key, hold for layer - `&lt n key`
    TapHold,
    /// Toggle layer on/off - `&tog n`
    Toggle,
    /// One-shot layer (next key only) - `&sl n`
    OneShot,
    /// Switch to layer - `&to n`
    SwitchTo,
}

impl LayerRefKind {
    /// Kind for a layer behavior label (`MO`, `LT`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "MO" => Some(Self::Momentary),
            "LT" => Some(Self::TapHold),
            "TOG" => Some(Self::Toggle),
            "SL" => Some(Self::OneShot),
            "TO" => Some(Self::SwitchTo),
            _ => None,
        }
    }

    /// Returns true if this is a "hold-like" layer reference that requires
    /// the target key position to remain transparent to avoid conflicts.
    ///
    /// Hold-like behaviors activate the layer while the key is held down,
    /// meaning the key at that position on the target layer will be accessed.
    #[must_use]
    pub const fn is_hold_like(self) -> bool {
        matches!(self, Self::Momentary | Self::TapHold)
    }

    /// Get a human-readable name for this layer reference kind
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Momentary => "Momentary (&mo)",
            Self::TapHold => "Tap-Hold (&lt)",
            Self::Toggle => "Toggle (&tog)",
            Self::OneShot => "One-Shot (&sl)",
            Self::SwitchTo => "Switch (&to)",
        }
    }
}

/// A reference from one layer to another via a layer-switching binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRef {
    /// Source layer index (where the key is)
    pub from_layer: usize,
    /// Target layer index (which layer it activates)
    pub to_layer: usize,
    /// Key position in the source layer
    pub position: usize,
    /// Type of layer reference
    pub kind: LayerRefKind,
    /// The binding at the key position (e.g. "&lt 2 SPACE", "&BHRM_L_Index")
    pub binding: String,
    /// Behavior the layer switch was found in, `None` for a direct binding
    pub via: Option<String>,
}

/// Layer switches reachable from one behavior, as (target, kind, behavior).
fn behavior_layer_refs(
    document: &Document,
    params: &LayerParams,
    name: &str,
    seen: &mut HashSet<String>,
) -> Vec<(usize, LayerRefKind, String)> {
    if !seen.insert(name.to_string()) {
        return Vec::new();
    }
    let Ok(behavior) = document.behavior(name) else {
        return Vec::new();
    };

    let mut refs = Vec::new();
    for step in behavior.steps() {
        for (to_layer, label) in step.layer_params(params) {
            if let Some(kind) = LayerRefKind::from_label(label) {
                refs.push((to_layer, kind, name.to_string()));
            }
        }
    }
    for referenced in behavior.referenced_names() {
        refs.extend(behavior_layer_refs(document, params, referenced, seen));
    }
    refs
}

/// Build a reverse index of all layer references in the document
///
/// Returns a map from target layer index to a list of all keys that reference it.
///
/// # Examples
/// ```
/// use hrmkit::models::{Binding, Document};
/// use hrmkit::services::layer_refs::build_layer_ref_index;
///
/// let document = Document::new()
///     .with_layer("Base", vec![Binding::parse("&mo 1")])
///     .with_layer("Lower", vec![Binding::transparent()]);
/// let index = build_layer_ref_index(&document);
///
/// // Layer 1 has one inbound reference from layer 0
/// assert_eq!(index.get(&1).unwrap().len(), 1);
/// ```
#[must_use]
pub fn build_layer_ref_index(document: &Document) -> HashMap<usize, Vec<LayerRef>> {
    let mut index: HashMap<usize, Vec<LayerRef>> = HashMap::new();
    let layer_count = document.layer_count();
    let params = LayerParams::of(document);

    for (from_layer, layer) in document.layers.iter().enumerate() {
        for (position, binding) in layer.iter().enumerate() {
            if binding.is_transparent() {
                continue;
            }

            let mut found = Vec::new();
            // Direct layer behaviors have no `via`; anything else passed the layer on
            let direct = binding.layer_behavior_label().is_some();
            for (to_layer, label) in binding.layer_params(&params) {
                if let Some(kind) = LayerRefKind::from_label(label) {
                    found.push((to_layer, kind, (!direct).then(|| binding.value.clone())));
                }
            }
            let mut seen = HashSet::new();
            for (to_layer, kind, via) in
                behavior_layer_refs(document, &params, &binding.value, &mut seen)
            {
                found.push((to_layer, kind, Some(via)));
            }

            for (to_layer, kind, via) in found {
                // Only track references to existing layers
                if to_layer < layer_count {
                    index.entry(to_layer).or_default().push(LayerRef {
                        from_layer,
                        to_layer,
                        position,
                        kind,
                        binding: binding.to_string(),
                        via,
                    });
                }
            }
        }
    }

    index
}

/// Check if placing `binding` at a position with inbound hold-like references
/// would create a potential conflict (non-transparent key where transparency expected)
///
/// Returns `Some(warning_message)` if there's a potential conflict, `None` otherwise
#[must_use]
pub fn check_transparency_conflict(
    target_layer: usize,
    position: usize,
    binding: &Binding,
    layer_refs: &HashMap<usize, Vec<LayerRef>>,
) -> Option<String> {
    if binding.is_transparent() {
        return None;
    }

    let refs = layer_refs.get(&target_layer)?;

    let conflicting_refs: Vec<&LayerRef> = refs
        .iter()
        .filter(|r| r.position == position && r.kind.is_hold_like())
        .collect();

    if conflicting_refs.is_empty() {
        return None;
    }

    let ref_descriptions: Vec<String> = conflicting_refs
        .iter()
        .map(|r| format!("Layer {} {}", r.from_layer, r.kind.display_name()))
        .collect();

    Some(format!(
        "Non-transparent key ({}) conflicts with hold-like reference from {}",
        binding,
        ref_descriptions.join(", ")
    ))
}
