//! Collision-checked renaming of behaviors and their reference sites.

use crate::constants::LEGACY_HRM_PREFIX;
use crate::error::{MergeError, MergeResult};
use crate::models::{Behavior, Binding, Document};
use crate::services::naming::NamingScheme;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::debug;

/// A bijective old -> new mapping over a set of behavior names.
///
/// Only names that actually change are stored; every other name maps to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    scheme: NamingScheme,
    changes: BTreeMap<String, String>,
    strip_suffixes: Vec<String>,
}

impl RenamePlan {
    /// Builds the mapping for `names` under `scheme`.
    ///
    /// Fails with `NameCollision` if two distinct names share a canonical name.
    ///
    /// # Examples
    ///
    /// ```
    /// use hrmkit::services::naming::NamingScheme;
    /// use hrmkit::services::rename::RenamePlan;
    ///
    /// let plan = RenamePlan::build(["&HRM_left_index_v1B_TKZ", "&kp"], NamingScheme::Bhrm).unwrap();
    /// assert_eq!(plan.new_name("&HRM_left_index_v1B_TKZ"), "&BHRM_L_Index");
    /// assert_eq!(plan.new_name("&kp"), "&kp");
    ///
    /// let err = RenamePlan::build(
    ///     ["&HRM_left_middy_v1B_TKZ", "&HRM_left_middle_v2"],
    ///     NamingScheme::Bhrm,
    /// );
    /// assert!(err.is_err());
    /// ```
    pub fn build<I, S>(names: I, scheme: NamingScheme) -> MergeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut owners: BTreeMap<String, String> = BTreeMap::new();
        let mut changes = BTreeMap::new();

        for name in names {
            let name = name.as_ref();
            let canonical = scheme.canonical_name(name);
            match owners.get(&canonical) {
                Some(owner) if owner == name => continue,
                Some(owner) => {
                    return Err(MergeError::NameCollision {
                        first: owner.clone(),
                        second: name.to_string(),
                        canonical,
                    });
                }
                None => {}
            }
            owners.insert(canonical.clone(), name.to_string());
            if canonical != name {
                changes.insert(name.to_string(), canonical);
            }
        }

        Ok(Self {
            scheme,
            changes,
            strip_suffixes: Vec::new(),
        })
    }

    /// Builds the mapping for a whole-document rename.
    ///
    /// Covers every registry behavior plus every legacy `&HRM_...` name the
    /// document uses anywhere: layer and combo bindings, hold-tap slots, macro
    /// steps, input listeners and free text. Names defined outside the
    /// registry (for example in `custom_defined_behaviors`) are therefore
    /// renamed at every site, not only in the text that defines them.
    pub fn for_document(document: &Document, scheme: NamingScheme) -> MergeResult<Self> {
        let mut names: Vec<String> = document
            .behavior_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut legacy = BTreeSet::new();

        let mut note = |name: &str| {
            if name.starts_with(LEGACY_HRM_PREFIX) {
                legacy.insert(name.to_string());
            }
        };
        for binding in document.layers.iter().flatten() {
            note(&binding.value);
        }
        for combo in document.combos_slice() {
            note(&combo.binding.value);
        }
        for name in document.behavior_names() {
            for referenced in document.behavior(name)?.referenced_names() {
                note(referenced);
            }
        }
        for listener in document.input_listeners.iter().flatten() {
            collect_strings(listener, &mut note);
        }
        for value in document.extra.values() {
            collect_strings(value, &mut |text: &str| {
                for found in hrm_token().find_iter(text) {
                    note(found.as_str());
                }
            });
        }

        names.extend(legacy);
        Self::build(names, scheme)
    }

    /// Description suffixes removed from renamed behaviors (e.g. `" - TailorKey"`).
    pub fn with_description_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.strip_suffixes = suffixes;
        self
    }

    /// New name for `old`.
    pub fn new_name(&self, old: &str) -> String {
        self.renamed(old).unwrap_or(old).to_string()
    }

    /// New name for `old`, `None` if it does not change.
    pub fn renamed(&self, old: &str) -> Option<&str> {
        self.changes.get(old).map(String::as_str)
    }

    /// Every (old, new) pair that changes, sorted by old name.
    pub fn changes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.changes.iter().map(|(old, new)| (old.as_str(), new.as_str()))
    }

    /// Checks if the plan renames nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Rewrites the behavior invoked by `binding`.
    pub fn apply_to_binding(&self, binding: &mut Binding) {
        if let Some(new) = self.renamed(&binding.value) {
            binding.value = new.to_string();
        }
    }

    /// Renames a detached behavior: registry key, references and description.
    pub fn apply_to_behavior(&self, behavior: &mut Behavior) {
        if let Some(new) = self.renamed(behavior.name()) {
            let new = new.to_string();
            behavior.set_name(new);
        }
        behavior.rename_references(|name| self.renamed(name).map(str::to_string));
        self.describe(behavior);
    }

    /// Regenerates the description of a behavior from its canonical name.
    fn describe(&self, behavior: &mut Behavior) {
        if self.scheme == NamingScheme::Preserve {
            return;
        }

        let mut description = behavior.description().to_string();
        for suffix in &self.strip_suffixes {
            description = description.replace(suffix.as_str(), "");
        }
        let mut description = description.trim().to_string();

        if let Some(parsed) = self.scheme.describe(behavior.name()) {
            match behavior {
                Behavior::Macro(_) => {
                    if let Some(text) = parsed.macro_description() {
                        description = text;
                    }
                }
                Behavior::HoldTap(_) => description = parsed.hold_tap_description(),
            }
        }
        behavior.set_description(description);
    }

    /// Renames behaviors in place across a whole document.
    ///
    /// Pass 1 rewrites registry keys, pass 2 rewrites every reference site:
    /// behavior definitions, layer bindings, combos, input listeners and
    /// `&HRM_...` tokens inside free-text fields.
    pub fn apply_to_document(&self, document: &mut Document) -> MergeResult<()> {
        for (old, new) in self.changes() {
            if document.contains_behavior(old) {
                debug!("Renaming {} -> {}", old, new);
                document.rename_behavior(old, new)?;
            }
        }

        document.map_behaviors(|behavior| {
            behavior.rename_references(|name| self.renamed(name).map(str::to_string));
            self.describe(behavior);
            Ok::<_, MergeError>(())
        })?;

        for layer in &mut document.layers {
            for binding in layer {
                self.apply_to_binding(binding);
            }
        }

        for combo in document.combos.iter_mut().flatten() {
            self.apply_to_binding(&mut combo.binding);
        }

        for listener in document.input_listeners.iter_mut().flatten() {
            self.rename_strings(listener);
        }

        for value in document.extra.values_mut() {
            self.rewrite_text(value);
        }

        Ok(())
    }

    /// Replaces string values equal to a renamed behavior.
    fn rename_strings(&self, value: &mut Value) {
        match value {
            Value::String(text) => {
                if let Some(new) = self.renamed(text) {
                    *text = new.to_string();
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.rename_strings(item)),
            Value::Object(map) => map.values_mut().for_each(|item| self.rename_strings(item)),
            _ => {}
        }
    }

    /// Rewrites renamed `&HRM_...` tokens embedded in free text (devicetree snippets, notes).
    fn rewrite_text(&self, value: &mut Value) {
        match value {
            Value::String(text) => {
                let rewritten = hrm_token().replace_all(text, |caps: &Captures<'_>| {
                    let found = &caps[0];
                    self.renamed(found).unwrap_or(found).to_string()
                });
                if rewritten != text.as_str() {
                    *text = rewritten.into_owned();
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.rewrite_text(item)),
            Value::Object(map) => map.values_mut().for_each(|item| self.rewrite_text(item)),
            _ => {}
        }
    }
}

/// Matches a legacy behavior name inside free text.
fn hrm_token() -> &'static Regex {
    static HRM_TOKEN: OnceLock<Regex> = OnceLock::new();
    HRM_TOKEN.get_or_init(|| Regex::new(r"&HRM_[A-Za-z0-9_]+").expect("valid regex"))
}

/// Calls `visit` on every string nested in `value`.
fn collect_strings(value: &Value, visit: &mut impl FnMut(&str)) {
    match value {
        Value::String(text) => visit(text),
        Value::Array(items) => {
            for item in items {
                collect_strings(item, visit);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_strings(item, visit);
            }
        }
        _ => {}
    }
}
