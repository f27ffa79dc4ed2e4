//! Set of firmware-provided behavior names.

use crate::constants::BUILTIN_BEHAVIORS;
use std::collections::HashSet;

/// Behavior names that resolve without a registry entry.
///
/// Starts from the ZMK built-in table and can be extended with names defined
/// elsewhere (for example in a layout's custom devicetree snippet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinBehaviors {
    names: HashSet<String>,
}

impl BuiltinBehaviors {
    /// Creates the set from the firmware table plus `extra` names.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builtins = Self::default();
        builtins.names.extend(extra.into_iter().map(Into::into));
        builtins
    }

    /// Checks if `name` is provided by the firmware.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl Default for BuiltinBehaviors {
    fn default() -> Self {
        Self {
            names: BUILTIN_BEHAVIORS.iter().map(|name| (*name).to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_contains_firmware_behaviors() {
        let builtins = BuiltinBehaviors::default();
        assert!(builtins.contains("&kp"));
        assert!(builtins.contains("&trans"));
        assert!(builtins.contains("&macro_pause_for_release"));
        assert!(!builtins.contains("&HRM_left_index_v1B_TKZ"));
    }

    #[test]
    fn test_with_extra() {
        let builtins = BuiltinBehaviors::with_extra(["&my_custom"]);
        assert!(builtins.contains("&my_custom"));
        assert!(builtins.contains("&mo"));
    }
}
