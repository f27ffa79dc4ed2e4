//! Binding parameters that carry layer indices.
//!
//! `&mo 3` names its layer directly, but a hold-tap defined as
//! `"bindings": ["&mo", "&kp"]` receives the layer from whatever binding
//! invokes it (`&my_lt 3 SPACE`): the first parameter goes to the hold slot,
//! the second to the tap slot. Macros forward their own parameters to the next
//! step through `&macro_param_NtoM`. [`LayerParams`] records, for every
//! behavior a document can invoke, which parameter positions are layer indices.

use crate::constants::LAYER_BEHAVIORS;
use crate::models::behavior::HoldTapSlot;
use crate::models::binding::{Binding, ParamValue};
use crate::models::document::Document;
use std::collections::{HashMap, HashSet};

const MACRO_PARAM_PREFIX: &str = "&macro_param_";

/// A parameter position that carries a layer index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerParam {
    /// Index into the invoking binding's params
    pub index: usize,
    /// Label of the layer behavior that finally receives it (`MO`, `TOG`, ...)
    pub label: &'static str,
}

/// Layer parameter positions per behavior name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerParams {
    slots: HashMap<String, Vec<LayerParam>>,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LayerParams {
    /// Table of the firmware layer behaviors only.
    pub fn builtin() -> Self {
        let slots = LAYER_BEHAVIORS
            .iter()
            .map(|&(name, label)| (name.to_string(), vec![LayerParam { index: 0, label }]))
            .collect();
        Self { slots }
    }

    /// Table covering every hold-tap and macro defined in `document`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hrmkit::models::{Behavior, Binding, Document, HoldTap, LayerParams};
    ///
    /// let document = Document::new()
    ///     .with_layer("Base", vec![Binding::parse("&my_lt 1 SPACE")])
    ///     .with_layer("Raise", vec![Binding::transparent()])
    ///     .with_behavior(Behavior::HoldTap(HoldTap::new("&my_lt", "&mo", "&kp")));
    /// let params = LayerParams::of(&document);
    ///
    /// assert_eq!(document.layers[0][0].layer_refs(&params), vec![1]);
    /// ```
    pub fn of(document: &Document) -> Self {
        let mut table = Self::builtin();
        for name in document.behavior_names() {
            table.resolve(document, name, &mut HashSet::new());
        }
        table
    }

    /// Layer parameter positions of `name`, empty if it takes no layer.
    pub fn slots(&self, name: &str) -> &[LayerParam] {
        self.slots.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    fn resolve(
        &mut self,
        document: &Document,
        name: &str,
        visiting: &mut HashSet<String>,
    ) -> Vec<LayerParam> {
        if let Some(known) = self.slots.get(name) {
            return known.clone();
        }
        if !visiting.insert(name.to_string()) {
            return Vec::new();
        }

        let mut found = Vec::new();
        if let Some(ht) = document.hold_taps_slice().iter().find(|ht| ht.name == name) {
            // Slot i receives param i; inline slots bring their own params
            for (index, slot) in ht.bindings.iter().enumerate().take(2) {
                let HoldTapSlot::Name(slot_name) = slot else {
                    continue;
                };
                let receiving = self.resolve(document, slot_name, visiting);
                if let Some(first) = receiving.iter().find(|p| p.index == 0) {
                    found.push(LayerParam {
                        index,
                        label: first.label,
                    });
                }
            }
        } else if let Some(m) = document.macros_slice().iter().find(|m| m.name == name) {
            for pair in m.bindings.windows(2) {
                let Some((from, to)) = macro_param_forward(&pair[0].value) else {
                    continue;
                };
                let receiving = self.resolve(document, &pair[1].value, visiting);
                if let Some(param) = receiving.iter().find(|p| p.index == to) {
                    if !found.iter().any(|p: &LayerParam| p.index == from) {
                        found.push(LayerParam {
                            index: from,
                            label: param.label,
                        });
                    }
                }
            }
        }

        visiting.remove(name);
        self.slots.insert(name.to_string(), found.clone());
        found
    }
}

/// Parses `&macro_param_NtoM` into zero-based (macro param, step param).
fn macro_param_forward(value: &str) -> Option<(usize, usize)> {
    let (from, to) = value.strip_prefix(MACRO_PARAM_PREFIX)?.split_once("to")?;
    let from: usize = from.parse().ok()?;
    let to: usize = to.parse().ok()?;
    Some((from.checked_sub(1)?, to.checked_sub(1)?))
}

impl Binding {
    /// Layer indices this binding refers to, with the receiving behavior's label.
    pub fn layer_params(&self, params: &LayerParams) -> Vec<(usize, &'static str)> {
        params
            .slots(&self.value)
            .iter()
            .filter_map(|slot| match self.params.get(slot.index)?.value {
                ParamValue::Integer(index) if index >= 0 => Some((index as usize, slot.label)),
                _ => None,
            })
            .collect()
    }

    /// Layer indices this binding refers to.
    pub fn layer_refs(&self, params: &LayerParams) -> Vec<usize> {
        self.layer_params(params)
            .into_iter()
            .map(|(index, _)| index)
            .collect()
    }

    /// Rewrites every layer index this binding refers to.
    ///
    /// Parameters that are not layer indices are left untouched.
    pub fn map_layer_refs<E>(
        &mut self,
        params: &LayerParams,
        mut remap: impl FnMut(usize) -> Result<usize, E>,
    ) -> Result<(), E> {
        for slot in params.slots(&self.value) {
            let Some(param) = self.params.get_mut(slot.index) else {
                continue;
            };
            if let ParamValue::Integer(old) = param.value {
                if old >= 0 {
                    param.value = ParamValue::Integer(remap(old as usize)? as i64);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Behavior, HoldTap, Macro};

    fn keys(values: &[&str]) -> Vec<Binding> {
        values.iter().map(|v| Binding::parse(v)).collect()
    }

    #[test]
    fn test_builtin_layer_behaviors() {
        let params = LayerParams::builtin();
        assert_eq!(Binding::parse("&lt 2 SPACE").layer_refs(&params), vec![2]);
        assert_eq!(Binding::parse("&tog 1").layer_params(&params), vec![(1, "TOG")]);
        assert!(Binding::parse("&kp 2").layer_refs(&params).is_empty());
        assert!(Binding::parse("&mo LOWER").layer_refs(&params).is_empty());
        assert!(Binding::parse("&mo -1").layer_refs(&params).is_empty());
        assert!(Binding::new("&mo").layer_refs(&params).is_empty());
    }

    #[test]
    fn test_hold_tap_slots_receive_params() {
        let doc = Document::new()
            .with_behavior(Behavior::HoldTap(HoldTap::new("&my_lt", "&mo", "&kp")))
            .with_behavior(Behavior::HoldTap(HoldTap::new("&key_tog", "&kp", "&tog")));
        let params = LayerParams::of(&doc);

        assert_eq!(params.slots("&my_lt"), &[LayerParam { index: 0, label: "MO" }]);
        assert_eq!(Binding::parse("&my_lt 3 A").layer_refs(&params), vec![3]);
        assert_eq!(Binding::parse("&key_tog LSHFT 2").layer_params(&params), vec![(2, "TOG")]);
    }

    #[test]
    fn test_inline_slot_is_not_a_param() {
        let mut ht = HoldTap::new("&inline", "&kp", "&kp");
        ht.bindings[0] = HoldTapSlot::Inline(Binding::parse("&mo 2"));
        let doc = Document::new().with_behavior(Behavior::HoldTap(ht));

        assert!(LayerParams::of(&doc).slots("&inline").is_empty());
    }

    #[test]
    fn test_macro_param_forwarding() {
        let doc = Document::new()
            .with_behavior(Behavior::Macro(Macro::new(
                "&layer_shift",
                keys(&[
                    "&macro_press",
                    "&macro_param_1to1",
                    "&mo MACRO_PLACEHOLDER",
                    "&kp LSHFT",
                    "&macro_pause_for_release",
                ]),
            )))
            .with_behavior(Behavior::Macro(Macro::new(
                "&second",
                keys(&["&macro_param_2to1", "&tog MACRO_PLACEHOLDER"]),
            )))
            .with_behavior(Behavior::HoldTap(HoldTap::new("&hrm", "&layer_shift", "&kp")));
        let params = LayerParams::of(&doc);

        assert_eq!(Binding::parse("&layer_shift 4").layer_refs(&params), vec![4]);
        assert_eq!(Binding::parse("&second A 1").layer_params(&params), vec![(1, "TOG")]);
        // hold-tap whose hold slot is the forwarding macro
        assert_eq!(Binding::parse("&hrm 2 F").layer_params(&params), vec![(2, "MO")]);
    }

    #[test]
    fn test_cyclic_definitions_terminate() {
        let doc = Document::new()
            .with_behavior(Behavior::HoldTap(HoldTap::new("&a", "&b", "&mo")))
            .with_behavior(Behavior::HoldTap(HoldTap::new("&b", "&a", "&kp")));
        let params = LayerParams::of(&doc);
        assert_eq!(Binding::parse("&a X 1").layer_refs(&params), vec![1]);
    }

    #[test]
    fn test_map_layer_refs() {
        let doc = Document::new()
            .with_behavior(Behavior::HoldTap(HoldTap::new("&my_lt", "&mo", "&kp")));
        let params = LayerParams::of(&doc);

        let mut binding = Binding::parse("&my_lt 2 SPACE");
        binding
            .map_layer_refs(&params, |idx| Ok::<_, ()>(idx + 1))
            .unwrap();
        assert_eq!(binding.to_string(), "&my_lt 3 SPACE");

        let mut key = Binding::parse("&kp 2");
        key.map_layer_refs(&params, |idx| Ok::<_, ()>(idx + 1)).unwrap();
        assert_eq!(key.to_string(), "&kp 2");
    }

    #[test]
    fn test_macro_param_forward_parsing() {
        assert_eq!(macro_param_forward("&macro_param_1to1"), Some((0, 0)));
        assert_eq!(macro_param_forward("&macro_param_2to1"), Some((1, 0)));
        assert_eq!(macro_param_forward("&macro_param_0to1"), None);
        assert_eq!(macro_param_forward("&macro_press"), None);
    }
}
