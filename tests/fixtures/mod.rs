//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test file uses every fixture

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the hrmkit binary
pub fn hrmkit_bin() -> &'static str {
    env!("CARGO_BIN_EXE_hrmkit")
}

/// Runs hrmkit with an isolated config directory.
///
/// `HRMKIT_CONFIG` is cleared and `XDG_CONFIG_HOME` points into `config_home`
/// so a developer's own configuration never leaks into test runs.
pub fn run_hrmkit(config_home: &Path, args: &[&str]) -> Output {
    Command::new(hrmkit_bin())
        .args(args)
        .env_remove("HRMKIT_CONFIG")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", config_home)
        .output()
        .expect("Failed to execute command")
}

/// Binding in layout-file form: `"&lt 2 SPACE"` becomes
/// `{"value": "&lt", "params": [{"value": 2, "params": []}, ...]}`.
pub fn binding(shorthand: &str) -> Value {
    let mut parts = shorthand.split_whitespace();
    let value = parts.next().unwrap_or_default();
    let params: Vec<Value> = parts
        .map(|part| match part.parse::<i64>() {
            Ok(number) => json!({ "value": number, "params": [] }),
            Err(_) => json!({ "value": part, "params": [] }),
        })
        .collect();
    json!({ "value": value, "params": params })
}

/// A layer from binding shorthands.
pub fn layer(bindings: &[&str]) -> Value {
    Value::Array(bindings.iter().map(|b| binding(b)).collect())
}

/// Source layout with a home-row-mod layer.
///
/// Layers: Base(0), HRM_macOS(1), Typing(2), LeftIndex(3). The left index
/// hold-tap holds through a macro that activates LeftIndex.
pub fn source_layout() -> Value {
    json!({
        "keyboard": "glove80",
        "title": "TailorKey source",
        "notes": "Uses &HRM_left_index_v1B_TKZ on the home row",
        "layer_names": ["Base", "HRM_macOS", "Typing", "LeftIndex"],
        "layers": [
            layer(&["&kp A", "&kp F", "&kp J"]),
            layer(&["&trans", "&HRM_left_index_v1B_TKZ", "&HRM_right_index_v1B_TKZ"]),
            layer(&["&kp X", "&kp Y", "&kp Z"]),
            layer(&["&trans", "&left_index_tap", "&kp LCTRL"]),
        ],
        "macros": [
            {
                "name": "&HRM_left_index_hold_v1B_TKZ",
                "description": "Left index hold - TailorKey",
                "bindings": [
                    binding("&macro_press"),
                    binding("&mo 3"),
                    binding("&kp LSHFT"),
                    binding("&macro_pause_for_release"),
                ],
                "waitMs": 0,
                "tapMs": 0
            },
            {
                "name": "&left_index_tap",
                "description": "",
                "bindings": [binding("&kp F")]
            }
        ],
        "holdTaps": [
            {
                "name": "&HRM_left_index_v1B_TKZ",
                "description": "Left index - TailorKey",
                "bindings": ["&HRM_left_index_hold_v1B_TKZ", "&kp"],
                "tappingTermMs": 280,
                "flavor": "balanced"
            },
            {
                "name": "&HRM_right_index_v1B_TKZ",
                "description": "Right index - TailorKey",
                "bindings": ["&kp", "&kp"],
                "tappingTermMs": 280,
                "flavor": "balanced"
            }
        ],
        "combos": [
            {
                "name": "typing_toggle",
                "binding": binding("&tog 2"),
                "keyPositions": [0, 2],
                "layers": [1, -1],
                "timeoutMs": 50
            }
        ]
    })
}

/// Source layout as the layout editor stores a plain hold-tap.
///
/// Same layers as [`source_layout`], but `&HRM_left_index_v1B_TKZ` has the bare
/// slots `["&mo", "&kp"]` and HRM_macOS invokes it as
/// `&HRM_left_index_v1B_TKZ 3 A`, so the layer index lives in the binding.
pub fn source_layout_with_layer_param() -> Value {
    let mut layout = source_layout();
    layout["layers"][1][1] = binding("&HRM_left_index_v1B_TKZ 3 A");
    layout["holdTaps"][0]["bindings"] = json!(["&mo", "&kp"]);
    if let Some(macros) = layout["macros"].as_array_mut() {
        macros.retain(|m| m["name"] != "&HRM_left_index_hold_v1B_TKZ");
    }
    layout
}

/// Target layout with an empty BaseModded layer.
///
/// Layers: Base(0), BaseModded(1), Lower(2), Magic(3).
pub fn target_layout() -> Value {
    json!({
        "keyboard": "glove80",
        "title": "Target",
        "layer_names": ["Base", "BaseModded", "Lower", "Magic"],
        "layers": [
            layer(&["&kp A", "&kp F", "&lt 2 SPACE"]),
            layer(&["&trans", "&trans", "&trans"]),
            layer(&["&mo 3", "&trans", "&trans"]),
            layer(&["&bootloader", "&trans", "&trans"]),
        ],
        "combos": [
            {
                "name": "magic",
                "binding": binding("&mo 3"),
                "keyPositions": [1, 2],
                "layers": [0, 2]
            }
        ],
        "inputListeners": [
            {
                "code": "&mmv_input_listener",
                "nodes": [{ "code": "scroll", "layers": [2, 3] }]
            }
        ]
    })
}

/// Layout whose base layer carries renamed home-row mods.
///
/// Layers: Base(0), Original(1), Lower(2). `&BHRM_L_Index` on Base is backed by
/// a hold macro switching to Lower.
pub fn hrm_base_layout() -> Value {
    json!({
        "keyboard": "glove80",
        "layer_names": ["Base", "Original", "Lower"],
        "layers": [
            layer(&["&kp Q", "&BHRM_L_Index", "&lt 2 SPACE"]),
            layer(&["&kp Q", "&kp F", "&kp SPACE"]),
            layer(&["&trans", "&trans", "&to 0"]),
        ],
        "macros": [
            {
                "name": "&BHRM_L_Index_Hold",
                "description": "Hold: activate Left Index layer",
                "bindings": [binding("&macro_press"), binding("&mo 2")]
            }
        ],
        "holdTaps": [
            {
                "name": "&BHRM_L_Index",
                "description": "",
                "bindings": ["&BHRM_L_Index_Hold", "&kp"]
            }
        ],
        "combos": [
            {
                "name": "lower",
                "binding": binding("&mo 2"),
                "keyPositions": [0, 1],
                "layers": [0, 2, -1]
            }
        ]
    })
}

/// Writes `layout` as pretty JSON under `dir`.
pub fn write_layout(dir: &Path, name: &str, layout: &Value) -> PathBuf {
    let path = dir.join(name);
    let content = serde_json::to_string_pretty(layout).expect("Failed to serialize layout");
    fs::write(&path, content).expect("Failed to write layout");
    path
}

/// Reads a layout file back as JSON.
pub fn read_layout(path: &Path) -> Value {
    let content = fs::read_to_string(path).expect("Failed to read layout");
    serde_json::from_str(&content).expect("Failed to parse layout")
}

/// Temp dir holding `source.json` and `target.json`.
pub fn merge_workspace() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = write_layout(temp_dir.path(), "source.json", &source_layout());
    let target = write_layout(temp_dir.path(), "target.json", &target_layout());
    (temp_dir, source, target)
}

/// Names of the hold-taps and macros in a layout, in file order.
pub fn behavior_names(layout: &Value) -> Vec<String> {
    ["holdTaps", "macros"]
        .iter()
        .filter_map(|key| layout[*key].as_array())
        .flatten()
        .filter_map(|behavior| behavior["name"].as_str().map(ToString::to_string))
        .collect()
}

/// Finds a hold-tap or macro by name.
pub fn find_behavior<'a>(layout: &'a Value, name: &str) -> Option<&'a Value> {
    ["holdTaps", "macros"]
        .iter()
        .filter_map(|key| layout[*key].as_array())
        .flatten()
        .find(|behavior| behavior["name"] == name)
}

/// Layer names of a layout.
pub fn layer_names(layout: &Value) -> Vec<String> {
    layout["layer_names"]
        .as_array()
        .map(|names| {
            names
                .iter()
                .filter_map(|name| name.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}
