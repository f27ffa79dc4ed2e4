//! Reference resolution over the behavior graph.
//!
//! Computes everything a set of bindings depends on: behaviors reachable
//! through hold-tap slots and macro steps, and the layers those behaviors jump
//! to or receive as a parameter (`&my_lt 3 SPACE`). A layer is not a leaf: its own bindings may invoke further behaviors
//! (finger and hand sub-layers do), so they are pulled in as well.

use crate::error::{MergeError, MergeResult};
use crate::models::{Binding, BuiltinBehaviors, Document, LayerParams};
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::debug;

/// Everything a set of root bindings needs in order to resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    /// Registry behaviors, in discovery order
    pub behaviors: Vec<String>,
    /// Source layer indices
    pub layers: BTreeSet<usize>,
}

impl Closure {
    /// Checks if `name` is part of the closure.
    pub fn contains_behavior(&self, name: &str) -> bool {
        self.behaviors.iter().any(|b| b == name)
    }

    /// Checks if nothing needs to be copied.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty() && self.layers.is_empty()
    }
}

/// A pending node of the traversal, with a description of who referenced it.
#[derive(Debug)]
enum Node {
    Behavior { name: String, referenced_by: String },
    Layer { index: usize, referenced_by: String },
}

/// Walks the reference graph of one document.
pub struct ReferenceResolver<'a> {
    document: &'a Document,
    builtins: &'a BuiltinBehaviors,
    params: LayerParams,
    opaque_layers: BTreeSet<usize>,
}

impl<'a> ReferenceResolver<'a> {
    /// Creates a resolver over `document`.
    pub fn new(document: &'a Document, builtins: &'a BuiltinBehaviors) -> Self {
        Self {
            document,
            builtins,
            params: LayerParams::of(document),
            opaque_layers: BTreeSet::new(),
        }
    }

    /// Layers that are recorded in the closure but whose bindings are not followed.
    pub fn with_opaque_layers(mut self, layers: impl IntoIterator<Item = usize>) -> Self {
        self.opaque_layers = layers.into_iter().collect();
        self
    }

    /// Closure of a set of bindings (for example the selected positions of a layer).
    pub fn resolve_bindings<'b>(
        &self,
        roots: impl IntoIterator<Item = &'b Binding>,
    ) -> MergeResult<Closure> {
        let mut frontier = VecDeque::new();
        for binding in roots {
            self.enqueue_binding(binding, &format!("binding '{binding}'"), &mut frontier)?;
        }
        self.traverse(frontier)
    }

    /// Closure of a set of behavior names.
    ///
    /// Every root must be a registry behavior.
    pub fn resolve_names<S: AsRef<str>>(&self, names: &[S]) -> MergeResult<Closure> {
        let mut frontier = VecDeque::new();
        for name in names {
            let name = name.as_ref();
            if !self.document.contains_behavior(name) {
                return Err(MergeError::DanglingReference {
                    name: name.to_string(),
                    referenced_by: "request".to_string(),
                });
            }
            frontier.push_back(Node::Behavior {
                name: name.to_string(),
                referenced_by: "request".to_string(),
            });
        }
        self.traverse(frontier)
    }

    fn traverse(&self, mut frontier: VecDeque<Node>) -> MergeResult<Closure> {
        let mut closure = Closure::default();
        let mut seen_behaviors: HashSet<String> = HashSet::new();

        while let Some(node) = frontier.pop_front() {
            match node {
                Node::Behavior {
                    name,
                    referenced_by,
                } => {
                    if !seen_behaviors.insert(name.clone()) {
                        continue;
                    }
                    debug!("Resolving behavior {} (from {})", name, referenced_by);
                    let behavior = self.document.behavior(&name)?;
                    let context = format!("{} '{}'", behavior.kind_name(), name);
                    for referenced in behavior.referenced_names() {
                        self.enqueue_name(referenced, &context, &mut frontier)?;
                    }
                    for index in behavior.layer_refs(&self.params) {
                        frontier.push_back(Node::Layer {
                            index,
                            referenced_by: context.clone(),
                        });
                    }
                    closure.behaviors.push(name);
                }
                Node::Layer {
                    index,
                    referenced_by,
                } => {
                    if closure.layers.contains(&index) {
                        continue;
                    }
                    let bindings = self.document.layer_at(index).ok_or_else(|| {
                        MergeError::DanglingLayerReference {
                            index,
                            context: referenced_by.clone(),
                        }
                    })?;
                    let layer_name = self.document.layer_name(index).unwrap_or_default();
                    closure.layers.insert(index);
                    if self.opaque_layers.contains(&index) {
                        debug!("Layer {} '{}' is not followed (from {})", index, layer_name, referenced_by);
                        continue;
                    }
                    debug!("Resolving layer {} '{}' (from {})", index, layer_name, referenced_by);
                    for (position, binding) in bindings.iter().enumerate() {
                        let context = format!("layer '{layer_name}' position {position}");
                        self.enqueue_binding(binding, &context, &mut frontier)?;
                    }
                }
            }
        }

        Ok(closure)
    }

    fn enqueue_binding(
        &self,
        binding: &Binding,
        context: &str,
        frontier: &mut VecDeque<Node>,
    ) -> MergeResult<()> {
        self.enqueue_name(&binding.value, context, frontier)?;
        for index in binding.layer_refs(&self.params) {
            frontier.push_back(Node::Layer {
                index,
                referenced_by: context.to_string(),
            });
        }
        Ok(())
    }

    fn enqueue_name(
        &self,
        name: &str,
        context: &str,
        frontier: &mut VecDeque<Node>,
    ) -> MergeResult<()> {
        if self.document.contains_behavior(name) {
            frontier.push_back(Node::Behavior {
                name: name.to_string(),
                referenced_by: context.to_string(),
            });
            Ok(())
        } else if self.builtins.contains(name) {
            Ok(())
        } else {
            Err(MergeError::DanglingReference {
                name: name.to_string(),
                referenced_by: context.to_string(),
            })
        }
    }
}

/// Checks that every behavior name and layer index in `document` resolves.
///
/// Covers layer bindings, behavior definitions and combos. Returns the first
/// unresolved reference.
pub fn check_references(document: &Document, builtins: &BuiltinBehaviors) -> MergeResult<()> {
    let params = LayerParams::of(document);
    let resolves = |name: &str| document.contains_behavior(name) || builtins.contains(name);
    let layer_in_range = |index: usize, context: &str| {
        if index < document.layer_count() {
            Ok(())
        } else {
            Err(MergeError::DanglingLayerReference {
                index,
                context: context.to_string(),
            })
        }
    };

    for (name, layer) in document.layer_names.iter().zip(&document.layers) {
        for (position, binding) in layer.iter().enumerate() {
            let context = format!("layer '{name}' position {position}");
            if !resolves(&binding.value) {
                return Err(MergeError::DanglingReference {
                    name: binding.value.clone(),
                    referenced_by: context,
                });
            }
            for index in binding.layer_refs(&params) {
                layer_in_range(index, &context)?;
            }
        }
    }

    for name in document.behavior_names() {
        let behavior = document.behavior(name)?;
        let context = format!("{} '{}'", behavior.kind_name(), name);
        for referenced in behavior.referenced_names() {
            if !resolves(referenced) {
                return Err(MergeError::DanglingReference {
                    name: referenced.to_string(),
                    referenced_by: context,
                });
            }
        }
        for index in behavior.layer_refs(&params) {
            layer_in_range(index, &context)?;
        }
    }

    for combo in document.combos_slice() {
        let context = format!("combo '{}'", combo.name);
        if !resolves(&combo.binding.value) {
            return Err(MergeError::DanglingReference {
                name: combo.binding.value.clone(),
                referenced_by: context,
            });
        }
        for index in combo.binding.layer_refs(&params) {
            layer_in_range(index, &context)?;
        }
        for &index in combo.layers.iter().filter(|&&index| index >= 0) {
            layer_in_range(index as usize, &context)?;
        }
    }

    Ok(())
}
