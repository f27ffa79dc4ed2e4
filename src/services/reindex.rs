//! Layer index maintenance.
//!
//! Layers are referenced by position from layer bindings, macro steps,
//! inline hold-tap slots, parameters passed to hold-taps and macros that
//! forward them to a layer behavior, combos and input listeners. Every structural change
//! to the layer list goes through this module so those references keep
//! pointing at the same layers afterwards.
//!
//! All operations work on a copy of the document and only replace the
//! caller's document once every reference has been rewritten.

use crate::error::{MergeError, MergeResult};
use crate::models::{Binding, Document, LayerParams};
use serde_json::Value;
use tracing::debug;

/// A structural change to the layer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerShift {
    /// A layer was inserted at `at`; references `>= at` move up by one.
    Insert {
        /// Index of the new layer
        at: usize,
    },
    /// The layer at `at` was removed; references above it move down by one.
    Remove {
        /// Index of the removed layer (old numbering)
        at: usize,
        /// Where references to the removed layer go (old numbering)
        redirect: Option<usize>,
    },
    /// Layer `i` moved to `new_index_of[i]`.
    Reorder(Vec<usize>),
}

impl LayerShift {
    /// Maps an old index to its new value, `None` if it no longer resolves.
    ///
    /// # Examples
    ///
    /// ```
    /// use hrmkit::services::reindex::LayerShift;
    ///
    /// let insert = LayerShift::Insert { at: 2 };
    /// assert_eq!(insert.remap(1), Some(1));
    /// assert_eq!(insert.remap(2), Some(3));
    ///
    /// let remove = LayerShift::Remove { at: 2, redirect: None };
    /// assert_eq!(remove.remap(2), None);
    /// assert_eq!(remove.remap(4), Some(3));
    /// ```
    pub fn remap(&self, index: usize) -> Option<usize> {
        match self {
            Self::Insert { at } => Some(if index >= *at { index + 1 } else { index }),
            Self::Remove { at, redirect } => {
                let target = if index == *at { (*redirect)? } else { index };
                Some(if target > *at { target - 1 } else { target })
            }
            Self::Reorder(new_index_of) => new_index_of.get(index).copied(),
        }
    }

    /// Rewrites every layer reference in `document`.
    ///
    /// Does not touch the layer list itself.
    fn apply(&self, document: &mut Document) -> MergeResult<()> {
        let params = LayerParams::of(document);
        let remap = |index: usize, context: &dyn Fn() -> String| {
            self.remap(index)
                .ok_or_else(|| MergeError::DanglingLayerReference {
                    index,
                    context: context(),
                })
        };

        for (name, layer) in document.layer_names.iter().zip(document.layers.iter_mut()) {
            for (position, binding) in layer.iter_mut().enumerate() {
                binding.map_layer_refs(&params, |index| {
                    remap(index, &|| format!("layer '{name}' position {position}"))
                })?;
            }
        }

        document.map_behaviors(|behavior| {
            let context = format!("{} '{}'", behavior.kind_name(), behavior.name());
            behavior.map_layer_refs(&params, |index| remap(index, &|| context.clone()))
        })?;

        for combo in document.combos.iter_mut().flatten() {
            let context = format!("combo '{}'", combo.name);
            combo
                .binding
                .map_layer_refs(&params, |index| remap(index, &|| context.clone()))?;
            for entry in combo.layers.iter_mut().filter(|entry| **entry >= 0) {
                *entry = remap(*entry as usize, &|| context.clone())? as i64;
            }
        }

        for (i, listener) in document.input_listeners.iter_mut().flatten().enumerate() {
            let context = format!("input listener {i}");
            shift_listener_layers(listener, &|index| remap(index, &|| context.clone()))?;
        }

        Ok(())
    }
}

/// Rewrites the integer entries of every nested `layers` array.
fn shift_listener_layers(
    value: &mut Value,
    remap: &dyn Fn(usize) -> MergeResult<usize>,
) -> MergeResult<()> {
    match value {
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                if key == "layers" {
                    if let Value::Array(entries) = item {
                        for entry in entries.iter_mut() {
                            if let Some(index) = entry.as_u64() {
                                *entry = Value::from(remap(index as usize)? as u64);
                            }
                        }
                        continue;
                    }
                }
                shift_listener_layers(item, remap)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                shift_listener_layers(item, remap)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Inserts a layer at `at` and shifts every reference `>= at` up by one.
///
/// `bindings` are taken as already expressed in the new numbering.
/// Inserting at `layer_count()` appends and leaves every reference unchanged.
pub fn insert_layer(
    document: &mut Document,
    at: usize,
    name: impl Into<String>,
    bindings: Vec<Binding>,
) -> MergeResult<()> {
    let name = name.into();
    let mut working = document.clone();
    let shift = LayerShift::Insert { at };
    if at < working.layer_count() {
        shift.apply(&mut working)?;
    }
    working.add_layer_at(at, name.as_str(), bindings)?;
    debug!("Inserted layer '{}' at {}", name, at);
    *document = working;
    Ok(())
}

/// Removes the layer at `at` and shifts every reference above it down by one.
///
/// References to the removed layer itself fail with `DanglingLayerReference`
/// unless `redirect` (old numbering) names another layer to point them at.
pub fn remove_layer(
    document: &mut Document,
    at: usize,
    redirect: Option<usize>,
) -> MergeResult<(String, Vec<Binding>)> {
    if let Some(target) = redirect {
        if target >= document.layer_count() {
            return Err(MergeError::LayerIndexOutOfRange {
                index: target,
                count: document.layer_count(),
                operation: format!("redirect for removed layer {at}"),
            });
        }
        if target == at {
            return Err(MergeError::DanglingLayerReference {
                index: target,
                context: format!("redirect for removed layer {at}"),
            });
        }
    }

    let mut working = document.clone();
    let removed = working.remove_layer(at)?;
    LayerShift::Remove { at, redirect }.apply(&mut working)?;
    debug!("Removed layer '{}' at {} (redirect {:?})", removed.0, at, redirect);
    *document = working;
    Ok(removed)
}

/// Moves every layer `i` to `new_index_of[i]`.
///
/// `new_index_of` must be a permutation of `0..layer_count()`.
pub fn reorder_layers(document: &mut Document, new_index_of: &[usize]) -> MergeResult<()> {
    let count = document.layer_count();
    let invalid = || MergeError::InvalidLayerOrder {
        order: new_index_of.to_vec(),
        count,
    };
    if new_index_of.len() != count {
        return Err(invalid());
    }
    let mut taken = vec![false; count];
    for &target in new_index_of {
        match taken.get_mut(target) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(invalid()),
        }
    }

    let mut working = document.clone();
    working.permute_layers(new_index_of);
    LayerShift::Reorder(new_index_of.to_vec()).apply(&mut working)?;
    *document = working;
    Ok(())
}

/// Exchanges the positions of layers `a` and `b`.
pub fn swap_layers(document: &mut Document, a: usize, b: usize) -> MergeResult<()> {
    let mut new_index_of: Vec<usize> = (0..document.layer_count()).collect();
    if a >= new_index_of.len() || b >= new_index_of.len() {
        return Err(MergeError::LayerIndexOutOfRange {
            index: a.max(b),
            count: new_index_of.len(),
            operation: "layer swap".to_string(),
        });
    }
    new_index_of.swap(a, b);
    debug!("Swapping layers {} and {}", a, b);
    reorder_layers(document, &new_index_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Behavior, Combo, HoldTap, HoldTapSlot, Macro};
    use serde_json::{json, Map};

    fn keys(values: &[&str]) -> Vec<Binding> {
        values.iter().map(|v| Binding::parse(v)).collect()
    }

    fn sample() -> Document {
        let mut inline = HoldTap::new("&lt_ht", "&kp", "&kp");
        inline.bindings[0] = HoldTapSlot::Inline(Binding::parse("&mo 2"));

        let mut doc = Document::new()
            .with_layer("Base", keys(&["&mo 1", "&lt 2 SPACE", "&kp A"]))
            .with_layer("Lower", keys(&["&trans", "&to 0", "&trans"]))
            .with_layer("Raise", keys(&["&tog 2", "&trans", "&sl 1"]))
            .with_behavior(Behavior::HoldTap(inline))
            .with_behavior(Behavior::Macro(Macro::new(
                "&m",
                keys(&["&macro_press", "&mo 2", "&macro_pause_for_release"]),
            )));
        doc.combos = Some(vec![Combo {
            name: "raise_combo".to_string(),
            binding: Binding::parse("&tog 2"),
            layers: vec![-1, 0, 2],
            extra: Map::new(),
        }]);
        doc.input_listeners = Some(vec![json!({
            "code": "&trackball",
            "nodes": [{"layers": [1, 2], "inputProcessors": []}]
        })]);
        doc
    }

    fn macro_layer(doc: &Document) -> Vec<usize> {
        doc.behavior("&m")
            .unwrap()
            .layer_refs(&LayerParams::builtin())
    }

    #[test]
    fn test_insert_shifts_every_reference() {
        let mut doc = sample();
        insert_layer(&mut doc, 1, "New", keys(&["&trans", "&trans", "&trans"])).unwrap();

        assert_eq!(doc.layer_names, vec!["Base", "New", "Lower", "Raise"]);
        assert_eq!(doc.layers[0][0], Binding::parse("&mo 2"));
        assert_eq!(doc.layers[0][1], Binding::parse("&lt 3 SPACE"));
        assert_eq!(doc.layers[2][1], Binding::parse("&to 0"));
        assert_eq!(doc.layers[3][0], Binding::parse("&tog 3"));
        assert_eq!(macro_layer(&doc), vec![3]);
        assert_eq!(
            doc.behavior("&lt_ht")
                .unwrap()
                .layer_refs(&LayerParams::builtin()),
            vec![3]
        );

        let combo = &doc.combos_slice()[0];
        assert_eq!(combo.binding, Binding::parse("&tog 3"));
        assert_eq!(combo.layers, vec![-1, 0, 3]);
        assert_eq!(
            doc.input_listeners.as_ref().unwrap()[0]["nodes"][0]["layers"],
            json!([2, 3])
        );
    }

    /// Hold-taps and macros that take their layer from the invoking binding.
    fn with_layer_params(mut doc: Document) -> Document {
        doc = doc
            .with_behavior(Behavior::HoldTap(HoldTap::new("&my_lt", "&mo", "&kp")))
            .with_behavior(Behavior::Macro(Macro::new(
                "&fwd",
                keys(&["&macro_param_1to1", "&tog MACRO_PLACEHOLDER"]),
            )))
            .with_behavior(Behavior::Macro(Macro::new("&uses_fwd", keys(&["&fwd 2"]))));
        doc.layers[0][2] = Binding::parse("&my_lt 2 SPACE");
        doc.layers[1][0] = Binding::parse("&fwd 1");
        if let Some(combos) = doc.combos.as_mut() {
            combos[0].binding = Binding::parse("&my_lt 1 ESC");
        }
        doc
    }

    #[test]
    fn test_insert_shifts_hold_tap_and_macro_params() {
        let mut doc = with_layer_params(sample());
        insert_layer(&mut doc, 1, "New", keys(&["&trans", "&trans", "&trans"])).unwrap();

        assert_eq!(doc.layers[0][2], Binding::parse("&my_lt 3 SPACE"));
        assert_eq!(doc.layers[2][0], Binding::parse("&fwd 2"));
        assert_eq!(doc.combos_slice()[0].binding, Binding::parse("&my_lt 2 ESC"));
        let Behavior::Macro(uses_fwd) = doc.behavior("&uses_fwd").unwrap() else {
            panic!("expected a macro");
        };
        assert_eq!(uses_fwd.bindings[0], Binding::parse("&fwd 3"));
        // placeholder text is not a layer
        let Behavior::Macro(fwd) = doc.behavior("&fwd").unwrap() else {
            panic!("expected a macro");
        };
        assert_eq!(fwd.bindings[1], Binding::parse("&tog MACRO_PLACEHOLDER"));
    }

    #[test]
    fn test_remove_layer_referenced_only_through_param() {
        let mut doc = Document::new()
            .with_layer("Base", keys(&["&my_lt 1 SPACE"]))
            .with_layer("Raise", keys(&["&trans"]))
            .with_behavior(Behavior::HoldTap(HoldTap::new("&my_lt", "&mo", "&kp")));
        let before = doc.clone();

        let err = remove_layer(&mut doc, 1, None).unwrap_err();
        assert!(matches!(err, MergeError::DanglingLayerReference { index: 1, .. }));
        assert_eq!(doc, before);

        remove_layer(&mut doc, 1, Some(0)).unwrap();
        assert_eq!(doc.layers[0][0], Binding::parse("&my_lt 0 SPACE"));
    }

    #[test]
    fn test_append_leaves_references_unchanged() {
        let mut doc = sample();
        let before = sample();
        insert_layer(&mut doc, 3, "Extra", keys(&["&trans", "&trans", "&trans"])).unwrap();
        assert_eq!(doc.layers[..3], before.layers[..]);
        assert_eq!(doc.macros, before.macros);
        assert_eq!(doc.combos, before.combos);
        assert_eq!(doc.input_listeners, before.input_listeners);
    }

    #[test]
    fn test_insert_then_remove_is_identity() {
        let mut doc = sample();
        insert_layer(&mut doc, 0, "Front", keys(&["&trans", "&trans", "&trans"])).unwrap();
        remove_layer(&mut doc, 0, None).unwrap();
        assert_eq!(doc, sample());
    }

    #[test]
    fn test_remove_referenced_layer_fails_atomically() {
        let mut doc = sample();
        let err = remove_layer(&mut doc, 2, None).unwrap_err();
        assert!(matches!(err, MergeError::DanglingLayerReference { index: 2, .. }));
        assert_eq!(doc, sample());
    }

    #[test]
    fn test_remove_with_redirect() {
        let mut doc = sample();
        let (name, _) = remove_layer(&mut doc, 1, Some(2)).unwrap();
        assert_eq!(name, "Lower");
        assert_eq!(doc.layer_names, vec!["Base", "Raise"]);
        // &mo 1 pointed at the removed layer, now at Raise (old 2, new 1)
        assert_eq!(doc.layers[0][0], Binding::parse("&mo 1"));
        assert_eq!(doc.layers[0][1], Binding::parse("&lt 1 SPACE"));
        assert_eq!(doc.layers[1][2], Binding::parse("&sl 1"));
        assert_eq!(doc.combos_slice()[0].layers, vec![-1, 0, 1]);
    }

    #[test]
    fn test_invalid_redirect() {
        let mut doc = sample();
        assert!(matches!(
            remove_layer(&mut doc, 1, Some(1)),
            Err(MergeError::DanglingLayerReference { index: 1, .. })
        ));
        assert!(matches!(
            remove_layer(&mut doc, 1, Some(9)),
            Err(MergeError::LayerIndexOutOfRange { index: 9, count: 3, .. })
        ));
        assert_eq!(doc, sample());
    }

    #[test]
    fn test_insert_past_end_is_an_argument_error() {
        let mut doc = sample();
        let err = insert_layer(&mut doc, 4, "Far", keys(&["&trans", "&trans", "&trans"]))
            .unwrap_err();
        assert!(matches!(err, MergeError::LayerIndexOutOfRange { index: 4, count: 3, .. }));
        assert_eq!(doc, sample());
    }

    #[test]
    fn test_swap_layers() {
        let mut doc = sample();
        swap_layers(&mut doc, 0, 2).unwrap();
        assert_eq!(doc.layer_names, vec!["Raise", "Lower", "Base"]);
        assert_eq!(doc.layers[2][0], Binding::parse("&mo 1"));
        assert_eq!(doc.layers[2][1], Binding::parse("&lt 0 SPACE"));
        assert_eq!(doc.layers[1][1], Binding::parse("&to 2"));
        assert_eq!(macro_layer(&doc), vec![0]);
        assert_eq!(doc.combos_slice()[0].layers, vec![-1, 2, 0]);

        swap_layers(&mut doc, 2, 0).unwrap();
        assert_eq!(doc, sample());
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let mut doc = sample();
        assert_eq!(
            reorder_layers(&mut doc, &[0, 0, 1]).unwrap_err(),
            MergeError::InvalidLayerOrder {
                order: vec![0, 0, 1],
                count: 3
            }
        );
        assert!(matches!(
            reorder_layers(&mut doc, &[0, 1]),
            Err(MergeError::InvalidLayerOrder { count: 3, .. })
        ));
        assert!(matches!(
            swap_layers(&mut doc, 0, 5),
            Err(MergeError::LayerIndexOutOfRange { index: 5, count: 3, .. })
        ));
        assert_eq!(doc, sample());
    }
}
