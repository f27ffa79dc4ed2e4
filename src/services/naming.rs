//! Canonical naming scheme for home-row-mod behaviors.
//!
//! Legacy TailorKey names look like `&HRM_left_index_hold_v1B_TKZ`. The
//! canonical form keeps only the semantic attributes:
//!
//! ```text
//! &BHRM_<L|R>_<Finger>[_<Combo>...][_<Hold|Tap>]
//! ```
//!
//! Parsing and rendering are pure functions so collision checks can be tested
//! without a document.

use crate::constants::{CANONICAL_HRM_PREFIX, LEGACY_HRM_PREFIX};
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Hand a home-row-mod key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    /// Left hand
    Left,
    /// Right hand
    Right,
}

impl Hand {
    /// Single-letter code used in canonical names.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
        }
    }

    /// Full name used in descriptions.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }

    fn from_legacy(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    fn from_code(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "L" => Some(Self::Left),
            "R" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Whether a behavior is the hold half or the tap half of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Activated while held
    Hold,
    /// Activated on tap
    Tap,
}

impl Role {
    /// Suffix used in canonical names.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Hold => "Hold",
            Self::Tap => "Tap",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "hold" => Some(Self::Hold),
            "tap" => Some(Self::Tap),
            _ => None,
        }
    }
}

/// Finger aliases found in legacy names.
const FINGER_ALIASES: &[(&str, &str)] = &[
    ("index", "Index"),
    ("middle", "Middle"),
    ("middy", "Middle"),
    ("ring", "Ring"),
    ("ringy", "Ring"),
    ("pinky", "Pinky"),
];

/// Semantic attributes of a home-row-mod behavior name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HrmName {
    /// Hand of the key
    pub hand: Hand,
    /// Primary finger (`Index`, `Middle`, ...)
    pub finger: String,
    /// Additional fingers of a combo key, in order
    pub combos: Vec<String>,
    /// Hold or tap half, `None` for the hold-tap itself
    pub role: Option<Role>,
}

impl HrmName {
    /// Parses a legacy or canonical name. Returns `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use hrmkit::services::naming::{Hand, HrmName, Role};
    ///
    /// let name = HrmName::parse("&HRM_left_index_hold_v1B_TKZ").unwrap();
    /// assert_eq!(name.hand, Hand::Left);
    /// assert_eq!(name.finger, "Index");
    /// assert_eq!(name.role, Some(Role::Hold));
    /// assert_eq!(name.canonical(), "&BHRM_L_Index_Hold");
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        if name.starts_with(CANONICAL_HRM_PREFIX) {
            Self::parse_canonical(name)
        } else if name.starts_with(LEGACY_HRM_PREFIX) {
            Self::parse_legacy(name)
        } else {
            None
        }
    }

    fn parse_legacy(name: &str) -> Option<Self> {
        let body = strip_version_suffix(name.strip_prefix('&')?);
        let parts: Vec<&str> = body.split('_').collect();
        if parts.len() < 3 || parts[0] != "HRM" {
            return None;
        }
        let hand = Hand::from_legacy(parts[1])?;

        let tokens: Vec<String> = parts[2..]
            .iter()
            .filter_map(|token| format_token(token))
            .collect();
        let (finger, rest) = tokens.split_first()?;

        let mut role = None;
        let mut combos = Vec::new();
        for token in rest {
            match Role::parse(token) {
                Some(parsed) if role.is_none() => role = Some(parsed),
                _ => combos.push(token.clone()),
            }
        }

        Some(Self {
            hand,
            finger: finger.clone(),
            combos,
            role,
        })
    }

    fn parse_canonical(name: &str) -> Option<Self> {
        let body = name.strip_prefix(CANONICAL_HRM_PREFIX)?;
        let mut tokens: Vec<&str> = body.split('_').collect();
        if tokens.len() < 2 {
            return None;
        }
        let hand = Hand::from_code(tokens.remove(0))?;

        let role = tokens.last().and_then(|last| Role::parse(last));
        if role.is_some() {
            tokens.pop();
        }

        let cleaned: Vec<String> = tokens.iter().filter_map(|t| format_token(t)).collect();
        let (finger, combos) = cleaned.split_first()?;

        Some(Self {
            hand,
            finger: finger.clone(),
            combos: combos.to_vec(),
            role,
        })
    }

    /// Renders the canonical `&BHRM_...` name.
    pub fn canonical(&self) -> String {
        let mut name = format!("{}{}_{}", CANONICAL_HRM_PREFIX, self.hand.code(), self.finger);
        for combo in &self.combos {
            name.push('_');
            name.push_str(combo);
        }
        if let Some(role) = self.role {
            name.push('_');
            name.push_str(role.suffix());
        }
        name
    }

    /// Description for a macro with this name, `None` when the name carries no role.
    pub fn macro_description(&self) -> Option<String> {
        match self.role? {
            Role::Hold => Some(format!(
                "Hold: activate {} {} layer",
                self.hand.display_name(),
                self.finger
            )),
            Role::Tap => Some("Tap: restore base key".to_string()),
        }
    }

    /// Description for a hold-tap with this name.
    pub fn hold_tap_description(&self) -> String {
        if self.combos.is_empty() {
            "HRM: tap→key, hold→layer".to_string()
        } else {
            let mut fingers = vec![self.finger.as_str()];
            fingers.extend(self.combos.iter().map(String::as_str));
            format!("Combo: {}", fingers.join(" + "))
        }
    }
}

/// Removes the `_v1B` / `_v1B_TKZ` version tail of a legacy name.
fn strip_version_suffix(name: &str) -> &str {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let re = VERSION.get_or_init(|| Regex::new(r"_v[0-9A-Za-z]*(_TKZ)?$").expect("valid regex"));
    match re.find(name) {
        Some(found) => &name[..found.start()],
        None => name,
    }
}

/// Normalizes one name token: drops `tkz`, version and digit tails, then maps
/// finger aliases or capitalizes. Returns `None` when nothing is left.
fn format_token(token: &str) -> Option<String> {
    static VERSION_TAIL: OnceLock<Regex> = OnceLock::new();
    static DIGIT_TAIL: OnceLock<Regex> = OnceLock::new();
    let version_tail = VERSION_TAIL.get_or_init(|| Regex::new(r"v\d+$").expect("valid regex"));
    let digit_tail = DIGIT_TAIL.get_or_init(|| Regex::new(r"\d+$").expect("valid regex"));

    let lowered = token.to_lowercase().replace("tkz", "");
    let lowered = version_tail.replace(&lowered, "");
    let lowered = digit_tail.replace(&lowered, "");
    let cleaned = lowered.trim_matches('_');
    if cleaned.is_empty() {
        return None;
    }

    if let Some((_, finger)) = FINGER_ALIASES.iter().find(|(alias, _)| *alias == cleaned) {
        return Some((*finger).to_string());
    }

    let mut chars = cleaned.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
}

/// Naming scheme applied to copied or renamed behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NamingScheme {
    /// Canonical `&BHRM_<hand>_<finger>...` names
    #[default]
    Bhrm,
    /// Keep source names unchanged
    Preserve,
}

impl NamingScheme {
    /// Canonical name for `name`; names the scheme does not recognize are returned unchanged.
    pub fn canonical_name(self, name: &str) -> String {
        match self {
            Self::Bhrm => HrmName::parse(name).map_or_else(|| name.to_string(), |n| n.canonical()),
            Self::Preserve => name.to_string(),
        }
    }

    /// Parsed attributes of `name` under this scheme.
    pub fn describe(self, name: &str) -> Option<HrmName> {
        match self {
            Self::Bhrm => HrmName::parse(name),
            Self::Preserve => None,
        }
    }

    /// Scheme name as written in config files and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bhrm => "bhrm",
            Self::Preserve => "preserve",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(name: &str) -> String {
        NamingScheme::Bhrm.canonical_name(name)
    }

    #[test]
    fn test_legacy_names() {
        assert_eq!(canonical("&HRM_left_index_v1B_TKZ"), "&BHRM_L_Index");
        assert_eq!(canonical("&HRM_left_index_hold_v1B_TKZ"), "&BHRM_L_Index_Hold");
        assert_eq!(canonical("&HRM_right_pinky_tap_v1B_TKZ"), "&BHRM_R_Pinky_Tap");
        assert_eq!(canonical("&HRM_left_middy_v1B_TKZ"), "&BHRM_L_Middle");
        assert_eq!(canonical("&HRM_right_ringy_v2"), "&BHRM_R_Ring");
    }

    #[test]
    fn test_legacy_combo_names() {
        assert_eq!(
            canonical("&HRM_left_index_middy_v1B_TKZ"),
            "&BHRM_L_Index_Middle"
        );
        assert_eq!(
            canonical("&HRM_left_index_middy_hold_v1B_TKZ"),
            "&BHRM_L_Index_Middle_Hold"
        );
        assert_eq!(
            canonical("&HRM_right_ring_pinky_tap_v1B_TKZ"),
            "&BHRM_R_Ring_Pinky_Tap"
        );
    }

    #[test]
    fn test_unrecognized_names_are_unchanged() {
        assert_eq!(canonical("&kp"), "&kp");
        assert_eq!(canonical("&HRM_up_index_v1B_TKZ"), "&HRM_up_index_v1B_TKZ");
        assert_eq!(canonical("&HRM_left"), "&HRM_left");
        assert_eq!(canonical("&BHRM_X_Index"), "&BHRM_X_Index");
    }

    #[test]
    fn test_canonical_names_are_stable() {
        for name in [
            "&HRM_left_index_v1B_TKZ",
            "&HRM_left_index_hold_v1B_TKZ",
            "&HRM_left_index_middy_tap_v1B_TKZ",
            "&HRM_right_pinky_v1B_TKZ",
        ] {
            let once = canonical(name);
            assert_eq!(canonical(&once), once, "not stable for {name}");
        }
    }

    #[test]
    fn test_canonical_input_is_normalized() {
        assert_eq!(canonical("&BHRM_l_middy_hold"), "&BHRM_L_Middle_Hold");
        assert_eq!(canonical("&BHRM_R_Index_ring2"), "&BHRM_R_Index_Ring");
    }

    #[test]
    fn test_distinct_attributes_render_distinct_names() {
        let mut seen = std::collections::HashSet::new();
        for hand in [Hand::Left, Hand::Right] {
            for finger in ["Index", "Middle", "Ring", "Pinky"] {
                for role in [None, Some(Role::Hold), Some(Role::Tap)] {
                    let name = HrmName {
                        hand,
                        finger: finger.to_string(),
                        combos: vec![],
                        role,
                    };
                    assert!(seen.insert(name.canonical()));
                }
            }
        }
    }

    #[test]
    fn test_descriptions() {
        let hold = HrmName::parse("&BHRM_R_Ring_Hold").unwrap();
        assert_eq!(
            hold.macro_description().as_deref(),
            Some("Hold: activate Right Ring layer")
        );
        let tap = HrmName::parse("&BHRM_L_Index_Tap").unwrap();
        assert_eq!(tap.macro_description().as_deref(), Some("Tap: restore base key"));

        let plain = HrmName::parse("&BHRM_L_Index").unwrap();
        assert_eq!(plain.macro_description(), None);
        assert_eq!(plain.hold_tap_description(), "HRM: tap→key, hold→layer");

        let combo = HrmName::parse("&BHRM_L_Index_Middle").unwrap();
        assert_eq!(combo.hold_tap_description(), "Combo: Index + Middle");
    }

    #[test]
    fn test_preserve_scheme_is_identity() {
        assert_eq!(
            NamingScheme::Preserve.canonical_name("&HRM_left_index_v1B_TKZ"),
            "&HRM_left_index_v1B_TKZ"
        );
        assert!(NamingScheme::Preserve.describe("&BHRM_L_Index").is_none());
    }
}
