//! Whole-layer edits built on top of the reindexer.
//!
//! These are the structural clean-ups done after a merge: moving home-row
//! mods onto a dedicated layer, promoting a modded base layer, and removing
//! layers by name. Each one edits a working copy and replaces the caller's
//! document only on success.

use crate::constants::{CANONICAL_HRM_PREFIX, LEGACY_HRM_PREFIX};
use crate::error::{MergeError, MergeResult};
use crate::models::{Binding, Document};
use crate::services::reindex;
use serde::Serialize;
use tracing::debug;

/// Result of [`insert_hrm_layer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HrmLayerReport {
    /// Name of the new layer
    pub layer: String,
    /// Index the new layer was inserted at
    pub index: usize,
    /// Positions moved off the base layer
    pub positions: Vec<usize>,
}

/// Result of [`swap_base_layers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapReport {
    /// Index of the modded layer after the swap
    pub modded_index: usize,
    /// Index of the base layer after the swap
    pub base_index: usize,
    /// Transparent positions of the modded layer filled from the base layer
    pub filled: Vec<usize>,
}

fn is_hrm(binding: &Binding) -> bool {
    binding.value.starts_with(CANONICAL_HRM_PREFIX) || binding.value.starts_with(LEGACY_HRM_PREFIX)
}

fn check_same_size(document: &Document, first: usize, second: usize) -> MergeResult<()> {
    let expected = document.layers[first].len();
    let actual = document.layers[second].len();
    if expected == actual {
        Ok(())
    } else {
        Err(MergeError::LayerSizeMismatch {
            layer: document.layer_names[second].clone(),
            expected,
            actual,
        })
    }
}

/// Moves every home-row-mod binding of `base` onto a new layer `name`
/// inserted right after it.
///
/// The vacated base positions get the binding at the same position of
/// `original`; the new layer is transparent everywhere else.
pub fn insert_hrm_layer(
    document: &mut Document,
    base: &str,
    original: &str,
    name: &str,
) -> MergeResult<HrmLayerReport> {
    let base_index = document.layer_index(base)?;
    let original_index = document.layer_index(original)?;
    check_same_size(document, base_index, original_index)?;

    let mut working = document.clone();
    let size = working.layers[base_index].len();
    let at = base_index + 1;
    reindex::insert_layer(&mut working, at, name, vec![Binding::transparent(); size])?;

    let original_index = working.layer_index(original)?;
    let positions: Vec<usize> = working.layers[base_index]
        .iter()
        .enumerate()
        .filter(|(_, binding)| is_hrm(binding))
        .map(|(position, _)| position)
        .collect();

    for &position in &positions {
        let restored = working.layers[original_index][position].clone();
        let moved = working.set_binding(base, position, restored)?;
        working.set_binding(name, position, moved)?;
    }
    debug!(
        "Moved {} home-row mods from '{}' to new layer '{}' at {}",
        positions.len(),
        base,
        name,
        at
    );

    *document = working;
    Ok(HrmLayerReport {
        layer: name.to_string(),
        index: at,
        positions,
    })
}

/// Promotes `modded` to the position of `base`.
///
/// Every transparent key of `modded` takes the base key at that position and
/// the base key becomes transparent, so `base` ends up as a fallback layer
/// holding only what `modded` overrides. The two layers then trade places.
pub fn swap_base_layers(document: &mut Document, base: &str, modded: &str) -> MergeResult<SwapReport> {
    let base_index = document.layer_index(base)?;
    let modded_index = document.layer_index(modded)?;
    check_same_size(document, base_index, modded_index)?;

    let mut working = document.clone();
    let mut filled = Vec::new();
    for position in 0..working.layers[base_index].len() {
        if working.layers[modded_index][position].is_transparent() {
            let base_key = working.set_binding(base, position, Binding::transparent())?;
            working.set_binding(modded, position, base_key)?;
            filled.push(position);
        }
    }

    reindex::swap_layers(&mut working, base_index, modded_index)?;
    debug!("Swapped '{}' and '{}', filled {} keys", base, modded, filled.len());

    *document = working;
    Ok(SwapReport {
        modded_index: base_index,
        base_index: modded_index,
        filled,
    })
}

/// Removes the layer called `layer`, pointing its references at `redirect`.
pub fn remove_named_layer(
    document: &mut Document,
    layer: &str,
    redirect: Option<&str>,
) -> MergeResult<usize> {
    let index = document.layer_index(layer)?;
    let redirect = redirect.map(|name| document.layer_index(name)).transpose()?;
    reindex::remove_layer(document, index, redirect)?;
    Ok(index)
}
