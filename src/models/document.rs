//! Layout document: layers, behavior registry and combos.

use crate::error::{MergeError, MergeResult};
use crate::models::behavior::{Behavior, HoldTap, Macro};
use crate::models::binding::Binding;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A key combination bound to one action on a set of layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    /// Combo name
    pub name: String,
    /// Action triggered by the combo
    pub binding: Binding,
    /// Layer indices the combo is active on (negative entries are wildcards)
    #[serde(default)]
    pub layers: Vec<i64>,
    /// Key positions, timeout and description, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A complete layout document as exported by the Glove80 layout editor.
///
/// # Validation
///
/// - `layer_names` and `layers` have the same length
/// - Layer names are unique
/// - All layers have the same number of positions
/// - Behavior names are unique across `holdTaps` and `macros`
///
/// Fields this crate does not interpret (`keyboard`, `title`,
/// `custom_defined_behaviors`, ...) are kept in `extra` and written back in
/// their original order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Uninterpreted top-level fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Layer names, parallel to `layers`
    pub layer_names: Vec<String>,
    /// Layers, each one binding per key position
    pub layers: Vec<Vec<Binding>>,
    /// Macro definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<Vec<Macro>>,
    /// Input listener definitions (free-form, may carry `layers` lists)
    #[serde(
        rename = "inputListeners",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub input_listeners: Option<Vec<Value>>,
    /// Hold-tap definitions
    #[serde(rename = "holdTaps", default, skip_serializing_if = "Option::is_none")]
    pub hold_taps: Option<Vec<HoldTap>>,
    /// Combo definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combos: Option<Vec<Combo>>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer without any checks (builder for fixtures and tests).
    pub fn with_layer(mut self, name: impl Into<String>, bindings: Vec<Binding>) -> Self {
        self.layer_names.push(name.into());
        self.layers.push(bindings);
        self
    }

    /// Adds a behavior without any checks (builder for fixtures and tests).
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.push_behavior(behavior);
        self
    }

    /// Number of key positions per layer, `None` for a document without layers.
    pub fn position_count(&self) -> Option<usize> {
        self.layers.first().map(Vec::len)
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Index of the layer called `name`.
    pub fn layer_index(&self, name: &str) -> MergeResult<usize> {
        self.layer_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| MergeError::layer_not_found(name))
    }

    /// Bindings of the layer called `name`.
    pub fn layer(&self, name: &str) -> MergeResult<&[Binding]> {
        let index = self.layer_index(name)?;
        Ok(&self.layers[index])
    }

    /// Bindings of the layer at `index`.
    pub fn layer_at(&self, index: usize) -> Option<&[Binding]> {
        self.layers.get(index).map(Vec::as_slice)
    }

    /// Name of the layer at `index`.
    pub fn layer_name(&self, index: usize) -> Option<&str> {
        self.layer_names.get(index).map(String::as_str)
    }

    /// Checks if a behavior called `name` is in the registry.
    pub fn contains_behavior(&self, name: &str) -> bool {
        self.hold_taps_slice().iter().any(|ht| ht.name == name)
            || self.macros_slice().iter().any(|m| m.name == name)
    }

    /// Looks up a behavior by registry key.
    pub fn behavior(&self, name: &str) -> MergeResult<Behavior> {
        if let Some(ht) = self.hold_taps_slice().iter().find(|ht| ht.name == name) {
            return Ok(Behavior::HoldTap(ht.clone()));
        }
        self.macros_slice()
            .iter()
            .find(|m| m.name == name)
            .map(|m| Behavior::Macro(m.clone()))
            .ok_or_else(|| MergeError::behavior_not_found(name))
    }

    /// All registry keys (hold-taps first, then macros).
    pub fn behavior_names(&self) -> Vec<&str> {
        self.hold_taps_slice()
            .iter()
            .map(|ht| ht.name.as_str())
            .chain(self.macros_slice().iter().map(|m| m.name.as_str()))
            .collect()
    }

    /// Adds a behavior to the registry.
    ///
    /// Fails with `TargetNameConflict` if the name is already taken.
    pub fn add_behavior(&mut self, behavior: Behavior) -> MergeResult<()> {
        if self.contains_behavior(behavior.name()) {
            return Err(MergeError::TargetNameConflict {
                name: behavior.name().to_string(),
            });
        }
        self.push_behavior(behavior);
        Ok(())
    }

    fn push_behavior(&mut self, behavior: Behavior) {
        match behavior {
            Behavior::HoldTap(ht) => self.hold_taps.get_or_insert_with(Vec::new).push(ht),
            Behavior::Macro(m) => self.macros.get_or_insert_with(Vec::new).push(m),
        }
    }

    /// Rewrites a registry key. References to `old` are left untouched.
    pub fn rename_behavior(&mut self, old: &str, new: &str) -> MergeResult<()> {
        if old == new {
            return if self.contains_behavior(old) {
                Ok(())
            } else {
                Err(MergeError::behavior_not_found(old))
            };
        }
        if self.contains_behavior(new) {
            return Err(MergeError::TargetNameConflict {
                name: new.to_string(),
            });
        }
        if let Some(ht) = self
            .hold_taps
            .iter_mut()
            .flatten()
            .find(|ht| ht.name == old)
        {
            ht.name = new.to_string();
            return Ok(());
        }
        if let Some(m) = self.macros.iter_mut().flatten().find(|m| m.name == old) {
            m.name = new.to_string();
            return Ok(());
        }
        Err(MergeError::behavior_not_found(old))
    }

    /// Applies `edit` to every behavior in the registry, in place.
    pub fn map_behaviors<E>(
        &mut self,
        mut edit: impl FnMut(&mut Behavior) -> Result<(), E>,
    ) -> Result<(), E> {
        for ht in self.hold_taps.iter_mut().flatten() {
            let mut behavior = Behavior::HoldTap(ht.clone());
            edit(&mut behavior)?;
            if let Behavior::HoldTap(updated) = behavior {
                *ht = updated;
            }
        }
        for m in self.macros.iter_mut().flatten() {
            let mut behavior = Behavior::Macro(m.clone());
            edit(&mut behavior)?;
            if let Behavior::Macro(updated) = behavior {
                *m = updated;
            }
        }
        Ok(())
    }

    /// Sorts `holdTaps` and `macros` by name.
    pub fn sort_behaviors(&mut self) {
        if let Some(hold_taps) = self.hold_taps.as_mut() {
            hold_taps.sort_by(|a, b| a.name.cmp(&b.name));
        }
        if let Some(macros) = self.macros.as_mut() {
            macros.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// Replaces the binding at `position` on the layer called `layer`.
    ///
    /// Returns the previous binding.
    pub fn set_binding(
        &mut self,
        layer: &str,
        position: usize,
        binding: Binding,
    ) -> MergeResult<Binding> {
        let index = self.layer_index(layer)?;
        let bindings = &mut self.layers[index];
        let len = bindings.len();
        let slot = bindings
            .get_mut(position)
            .ok_or_else(|| MergeError::PositionOutOfRange {
                layer: layer.to_string(),
                position,
                len,
            })?;
        Ok(std::mem::replace(slot, binding))
    }

    /// Inserts a layer at `index` without touching any layer reference.
    ///
    /// Callers go through `services::reindex::insert_layer` to keep references valid.
    pub fn add_layer_at(
        &mut self,
        index: usize,
        name: impl Into<String>,
        bindings: Vec<Binding>,
    ) -> MergeResult<()> {
        let name = name.into();
        if self.layer_names.contains(&name) {
            return Err(MergeError::DuplicateLayer(name));
        }
        if let Some(expected) = self.position_count() {
            if bindings.len() != expected {
                return Err(MergeError::LayerSizeMismatch {
                    layer: name,
                    expected,
                    actual: bindings.len(),
                });
            }
        }
        if index > self.layers.len() {
            return Err(MergeError::LayerIndexOutOfRange {
                index,
                count: self.layers.len(),
                operation: format!("insertion of layer '{name}'"),
            });
        }
        self.layer_names.insert(index, name);
        self.layers.insert(index, bindings);
        Ok(())
    }

    /// Removes the layer at `index` without touching any layer reference.
    ///
    /// Callers go through `services::reindex::remove_layer` to keep references valid.
    pub fn remove_layer(&mut self, index: usize) -> MergeResult<(String, Vec<Binding>)> {
        if index >= self.layers.len() {
            return Err(MergeError::LayerIndexOutOfRange {
                index,
                count: self.layers.len(),
                operation: "layer removal".to_string(),
            });
        }
        Ok((self.layer_names.remove(index), self.layers.remove(index)))
    }

    /// Moves every layer to `new_index_of[old_index]`.
    ///
    /// `new_index_of` must be a permutation of `0..layer_count()`.
    pub(crate) fn permute_layers(&mut self, new_index_of: &[usize]) {
        let mut slots: Vec<Option<(String, Vec<Binding>)>> = vec![None; self.layers.len()];
        let names = std::mem::take(&mut self.layer_names);
        let layers = std::mem::take(&mut self.layers);
        for (old, entry) in names.into_iter().zip(layers).enumerate() {
            slots[new_index_of[old]] = Some(entry);
        }
        for (name, bindings) in slots.into_iter().flatten() {
            self.layer_names.push(name);
            self.layers.push(bindings);
        }
    }

    /// Hold-tap definitions, empty when the document has none.
    pub fn hold_taps_slice(&self) -> &[HoldTap] {
        self.hold_taps.as_deref().unwrap_or_default()
    }

    /// Macro definitions, empty when the document has none.
    pub fn macros_slice(&self) -> &[Macro] {
        self.macros.as_deref().unwrap_or_default()
    }

    /// Combo definitions, empty when the document has none.
    pub fn combos_slice(&self) -> &[Combo] {
        self.combos.as_deref().unwrap_or_default()
    }

    /// Validates the document structure.
    ///
    /// Checks:
    /// - `layer_names` and `layers` have the same length
    /// - Layer names are unique
    /// - All layers have the same number of positions
    /// - Behavior names are unique
    pub fn validate(&self) -> Result<()> {
        if self.layer_names.len() != self.layers.len() {
            anyhow::bail!(
                "Document has {} layer names but {} layers",
                self.layer_names.len(),
                self.layers.len()
            );
        }

        let mut names = HashSet::new();
        for name in &self.layer_names {
            if !names.insert(name) {
                anyhow::bail!("Duplicate layer name '{}'", name);
            }
        }

        if let Some(expected) = self.position_count() {
            for (name, layer) in self.layer_names.iter().zip(&self.layers) {
                if layer.len() != expected {
                    anyhow::bail!(
                        "All layers must have the same number of positions. Layer '{}' has {}, expected {}",
                        name,
                        layer.len(),
                        expected
                    );
                }
            }
        }

        let mut behaviors = HashSet::new();
        for name in self.behavior_names() {
            if !behaviors.insert(name) {
                anyhow::bail!("Duplicate behavior name '{}'", name);
            }
        }

        Ok(())
    }
}
