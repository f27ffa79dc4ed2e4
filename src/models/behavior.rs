//! Hold-tap and macro behavior definitions.

use crate::models::binding::Binding;
use crate::models::layer_params::LayerParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One slot of a hold-tap: a behavior name (`"&kp"`) or an inline binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HoldTapSlot {
    /// Behavior referenced by name
    Name(String),
    /// Inline binding
    Inline(Binding),
}

impl HoldTapSlot {
    /// Behavior name invoked by this slot.
    pub fn behavior_name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Inline(binding) => &binding.value,
        }
    }

    fn behavior_name_mut(&mut self) -> &mut String {
        match self {
            Self::Name(name) => name,
            Self::Inline(binding) => &mut binding.value,
        }
    }
}

/// A behavior with distinct actions for held (slot 0) and tapped (slot 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldTap {
    /// Registry key, e.g. `&HRM_left_index_v1B_TKZ`
    pub name: String,
    /// Free-form description shown by the layout editor
    #[serde(default)]
    pub description: String,
    /// Hold and tap slots, in that order
    pub bindings: Vec<HoldTapSlot>,
    /// Timing and flavor settings, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HoldTap {
    /// Creates a hold-tap from its hold and tap behavior names.
    pub fn new(name: impl Into<String>, hold: impl Into<String>, tap: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            bindings: vec![
                HoldTapSlot::Name(hold.into()),
                HoldTapSlot::Name(tap.into()),
            ],
            extra: Map::new(),
        }
    }

    /// Slot invoked while the key is held.
    pub fn hold(&self) -> Option<&HoldTapSlot> {
        self.bindings.first()
    }

    /// Slot invoked when the key is tapped.
    pub fn tap(&self) -> Option<&HoldTapSlot> {
        self.bindings.get(1)
    }
}

/// An ordered sequence of steps, each a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    /// Registry key, e.g. `&HRM_left_index_hold_v1B_TKZ`
    pub name: String,
    /// Free-form description shown by the layout editor
    #[serde(default)]
    pub description: String,
    /// Macro steps
    pub bindings: Vec<Binding>,
    /// Wait/tap timings and parameter declarations, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Macro {
    /// Creates a macro from its steps.
    pub fn new(name: impl Into<String>, steps: Vec<Binding>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            bindings: steps,
            extra: Map::new(),
        }
    }
}

/// A named, reusable behavior from the document's registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    /// Hold-tap definition (`holdTaps` array)
    HoldTap(HoldTap),
    /// Macro definition (`macros` array)
    Macro(Macro),
}

impl Behavior {
    /// Registry key.
    pub fn name(&self) -> &str {
        match self {
            Self::HoldTap(ht) => &ht.name,
            Self::Macro(m) => &m.name,
        }
    }

    /// Replaces the registry key.
    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Self::HoldTap(ht) => ht.name = name.into(),
            Self::Macro(m) => m.name = name.into(),
        }
    }

    /// Description text.
    pub fn description(&self) -> &str {
        match self {
            Self::HoldTap(ht) => &ht.description,
            Self::Macro(m) => &m.description,
        }
    }

    /// Replaces the description text.
    pub fn set_description(&mut self, description: impl Into<String>) {
        match self {
            Self::HoldTap(ht) => ht.description = description.into(),
            Self::Macro(m) => m.description = description.into(),
        }
    }

    /// Human-readable kind, used in reports.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::HoldTap(_) => "holdTap",
            Self::Macro(_) => "macro",
        }
    }

    /// Every behavior name this definition invokes, in slot/step order.
    pub fn referenced_names(&self) -> Vec<&str> {
        match self {
            Self::HoldTap(ht) => ht.bindings.iter().map(HoldTapSlot::behavior_name).collect(),
            Self::Macro(m) => m.bindings.iter().map(|step| step.value.as_str()).collect(),
        }
    }

    /// Bindings carried inside this definition: macro steps and inline hold-tap slots.
    pub fn steps(&self) -> Vec<&Binding> {
        match self {
            Self::HoldTap(ht) => ht
                .bindings
                .iter()
                .filter_map(|slot| match slot {
                    HoldTapSlot::Inline(binding) => Some(binding),
                    HoldTapSlot::Name(_) => None,
                })
                .collect(),
            Self::Macro(m) => m.bindings.iter().collect(),
        }
    }

    /// Every layer index this definition jumps to.
    ///
    /// Slots that only name a behavior take their layer from the invoking
    /// binding and are not listed here.
    pub fn layer_refs(&self, params: &LayerParams) -> Vec<usize> {
        self.steps()
            .into_iter()
            .flat_map(|step| step.layer_refs(params))
            .collect()
    }

    /// Rewrites every invoked behavior name for which `rename` returns a new name.
    pub fn rename_references(&mut self, rename: impl Fn(&str) -> Option<String>) {
        match self {
            Self::HoldTap(ht) => {
                for slot in &mut ht.bindings {
                    let name = slot.behavior_name_mut();
                    if let Some(new_name) = rename(name.as_str()) {
                        *name = new_name;
                    }
                }
            }
            Self::Macro(m) => {
                for step in &mut m.bindings {
                    if let Some(new_name) = rename(&step.value) {
                        step.value = new_name;
                    }
                }
            }
        }
    }

    /// Rewrites every layer index referenced by this definition.
    pub fn map_layer_refs<E>(
        &mut self,
        params: &LayerParams,
        mut remap: impl FnMut(usize) -> Result<usize, E>,
    ) -> Result<(), E> {
        match self {
            Self::HoldTap(ht) => {
                for slot in &mut ht.bindings {
                    if let HoldTapSlot::Inline(binding) = slot {
                        binding.map_layer_refs(params, &mut remap)?;
                    }
                }
            }
            Self::Macro(m) => {
                for step in &mut m.bindings {
                    step.map_layer_refs(params, &mut remap)?;
                }
            }
        }
        Ok(())
    }
}
