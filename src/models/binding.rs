//! Key binding data structures.

use crate::constants::{LAYER_BEHAVIORS, TRANSPARENT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a binding parameter.
///
/// Layout files mix keycode names (`"LEFT_SHIFT"`) and plain integers. Integers
/// in the first slot of a layer-switching behavior are layer indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer parameter (layer index, count, ...)
    Integer(i64),
    /// Symbolic parameter (keycode, modifier, ...)
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

/// A binding parameter, optionally carrying nested parameters (`LS(A)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter value
    pub value: ParamValue,
    /// Nested parameters
    #[serde(default)]
    pub params: Vec<Param>,
}

impl Param {
    /// Creates an integer parameter.
    pub const fn integer(value: i64) -> Self {
        Self {
            value: ParamValue::Integer(value),
            params: Vec::new(),
        }
    }

    /// Creates a symbolic parameter.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: ParamValue::Text(value.into()),
            params: Vec::new(),
        }
    }
}

/// The action assigned to one key position, or one step of a macro.
///
/// `value` names the invoked behavior (`&kp`, `&mo`, `&HRM_left_index_v1B_TKZ`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Invoked behavior name
    pub value: String,
    /// Behavior parameters
    #[serde(default)]
    pub params: Vec<Param>,
}

impl Binding {
    /// Creates a binding without parameters.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter.
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// The transparent marker binding.
    pub fn transparent() -> Self {
        Self::new(TRANSPARENT)
    }

    /// Parses the devicetree-like shorthand used in keymaps (`"&mo 3"`, `"&kp A"`).
    ///
    /// Numeric tokens become integer parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use hrmkit::models::{Binding, Param};
    ///
    /// let binding = Binding::parse("&lt 2 SPACE");
    /// assert_eq!(binding.value, "&lt");
    /// assert_eq!(binding.params, vec![Param::integer(2), Param::text("SPACE")]);
    /// assert_eq!(binding.layer_behavior_label(), Some("LT"));
    /// ```
    pub fn parse(shorthand: &str) -> Self {
        let mut tokens = shorthand.split_whitespace();
        let value = tokens.next().unwrap_or(TRANSPARENT).to_string();
        let params = tokens
            .map(|token| match token.parse::<i64>() {
                Ok(number) => Param::integer(number),
                Err(_) => Param::text(token),
            })
            .collect();
        Self { value, params }
    }

    /// Checks if this binding defers to the layer below.
    pub fn is_transparent(&self) -> bool {
        self.value == TRANSPARENT
    }

    /// Short label for a layer-switching behavior, `None` for anything else.
    pub fn layer_behavior_label(&self) -> Option<&'static str> {
        LAYER_BEHAVIORS
            .iter()
            .find(|(name, _)| *name == self.value)
            .map(|(_, label)| *label)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        for param in &self.params {
            write!(f, " {}", param.value)?;
        }
        Ok(())
    }
}
