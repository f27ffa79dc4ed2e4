//! Application-wide constants.
//!
//! This module defines the application name plus the firmware-level tables the
//! document model relies on: which behavior names are built into ZMK and which
//! of them take a layer index as their first parameter.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "hrmkit";

/// Directory name used below the platform config directory.
pub const CONFIG_DIR_NAME: &str = "hrmkit";

/// Binding value of the transparent marker ("defer to the layer below").
pub const TRANSPARENT: &str = "&trans";

/// Prefix of legacy TailorKey home-row-mod behavior names.
pub const LEGACY_HRM_PREFIX: &str = "&HRM_";

/// Prefix of canonical home-row-mod behavior names.
pub const CANONICAL_HRM_PREFIX: &str = "&BHRM_";

/// Behaviors whose first parameter is a layer index.
///
/// The second element is a short label used by the `layer-refs` report.
pub const LAYER_BEHAVIORS: &[(&str, &str)] = &[
    ("&mo", "MO"),
    ("&lt", "LT"),
    ("&to", "TO"),
    ("&tog", "TOG"),
    ("&sl", "SL"),
];

/// Behaviors provided by the firmware itself.
///
/// These never appear in a layout's `holdTaps`/`macros` registry, so a
/// reference to them is never dangling.
pub const BUILTIN_BEHAVIORS: &[&str] = &[
    "&trans",
    "&none",
    "&kp",
    "&kt",
    "&mt",
    "&lt",
    "&mo",
    "&to",
    "&tog",
    "&sl",
    "&sk",
    "&gresc",
    "&caps_word",
    "&key_repeat",
    "&bt",
    "&out",
    "&ext_power",
    "&rgb_ug",
    "&bl",
    "&mkp",
    "&mmv",
    "&msc",
    "&reset",
    "&sys_reset",
    "&bootloader",
    "&soft_off",
    "&studio_unlock",
    "&magic",
    "&lower",
    "&macro_press",
    "&macro_release",
    "&macro_tap",
    "&macro_wait_time",
    "&macro_tap_time",
    "&macro_pause_for_release",
    "&macro_param_1to1",
    "&macro_param_1to2",
    "&macro_param_2to1",
    "&macro_param_2to2",
];
