//! End-to-end tests for `hrmkit insert-layer`, `swap-layers` and `remove-layer`.

use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

fn workspace(layout: &Value) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_layout(temp_dir.path(), "layout.json", layout);
    (temp_dir, path)
}

// ============================================================================
// insert-layer
// ============================================================================

#[test]
fn test_insert_layer_moves_home_row_mods() {
    let (temp_dir, path) = workspace(&hrm_base_layout());
    let output = run_hrmkit(temp_dir.path(), &["insert-layer", "--input", path.to_str().unwrap()]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Inserted layer 'HRM' at index 1"));

    let layout = read_layout(&path);
    assert_eq!(layer_names(&layout), vec!["Base", "HRM", "Original", "Lower"]);

    // Base gets the plain key back, HRM holds the mod
    assert_eq!(layout["layers"][0][1]["value"], "&kp");
    assert_eq!(layout["layers"][0][1]["params"][0]["value"], "F");
    assert_eq!(layout["layers"][1][0]["value"], "&trans");
    assert_eq!(layout["layers"][1][1]["value"], "&BHRM_L_Index");
    assert_eq!(layout["layers"][1][2]["value"], "&trans");
}

#[test]
fn test_insert_layer_shifts_references() {
    let (temp_dir, path) = workspace(&hrm_base_layout());
    let output = run_hrmkit(temp_dir.path(), &["insert-layer", "--input", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));

    let layout = read_layout(&path);
    // Lower moved from 2 to 3
    assert_eq!(layout["layers"][0][2]["params"][0]["value"], 3);
    let hold = find_behavior(&layout, "&BHRM_L_Index_Hold").unwrap();
    assert_eq!(hold["bindings"][1]["params"][0]["value"], 3);
    assert_eq!(layout["combos"][0]["binding"]["params"][0]["value"], 3);
    assert_eq!(layout["combos"][0]["layers"], json!([0, 3, -1]));
    // &to 0 still points at Base
    assert_eq!(layout["layers"][3][2]["params"][0]["value"], 0);
}

#[test]
fn test_insert_layer_custom_names_and_output() {
    let mut base = hrm_base_layout();
    base["layer_names"] = json!(["Typing", "Plain", "Lower"]);
    let (temp_dir, path) = workspace(&base);
    let before = fs::read(&path).unwrap();
    let out_path = temp_dir.path().join("out.json");

    let output = run_hrmkit(
        temp_dir.path(),
        &[
            "insert-layer",
            "--input",
            path.to_str().unwrap(),
            "--output",
            out_path.to_str().unwrap(),
            "--base",
            "Typing",
            "--original",
            "Plain",
            "--name",
            "Mods",
            "--json",
        ],
    );
    assert_eq!(output.status.code(), Some(0));

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["layer"], "Mods");
    assert_eq!(report["index"], 1);
    assert_eq!(report["positions"], json!([1]));

    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(
        layer_names(&read_layout(&out_path)),
        vec!["Typing", "Mods", "Plain", "Lower"]
    );
}

#[test]
fn test_insert_layer_existing_name_fails() {
    let (temp_dir, path) = workspace(&hrm_base_layout());
    let before = fs::read(&path).unwrap();

    let output = run_hrmkit(
        temp_dir.path(),
        &["insert-layer", "--input", path.to_str().unwrap(), "--name", "Lower"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Layer 'Lower' already exists"));
    assert_eq!(fs::read(&path).unwrap(), before);
}

// ============================================================================
// swap-layers
// ============================================================================

fn swap_layout() -> Value {
    let mut layout = target_layout();
    layout["layers"][1][1] = binding("&kp G");
    layout
}

#[test]
fn test_swap_layers_promotes_modded() {
    let (temp_dir, path) = workspace(&swap_layout());
    let output = run_hrmkit(
        temp_dir.path(),
        &["swap-layers", "--input", path.to_str().unwrap(), "--json"],
    );
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["modded_index"], 0);
    assert_eq!(report["base_index"], 1);
    assert_eq!(report["filled"], json!([0, 2]));

    let layout = read_layout(&path);
    assert_eq!(layer_names(&layout), vec!["BaseModded", "Base", "Lower", "Magic"]);

    // Promoted layer is complete, fallback keeps only what was overridden
    assert_eq!(layout["layers"][0][0]["params"][0]["value"], "A");
    assert_eq!(layout["layers"][0][1]["params"][0]["value"], "G");
    assert_eq!(layout["layers"][0][2]["value"], "&lt");
    assert_eq!(layout["layers"][1][0]["value"], "&trans");
    assert_eq!(layout["layers"][1][1]["params"][0]["value"], "F");
    assert_eq!(layout["layers"][1][2]["value"], "&trans");
}

#[test]
fn test_swap_layers_follows_references() {
    let (temp_dir, path) = workspace(&swap_layout());
    let output = run_hrmkit(temp_dir.path(), &["swap-layers", "--input", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));

    let layout = read_layout(&path);
    // Combo was active on Base, which now sits at index 1
    assert_eq!(layout["combos"][0]["layers"], json!([1, 2]));
    // Lower and Magic did not move
    assert_eq!(layout["layers"][0][2]["params"][0]["value"], 2);
    assert_eq!(layout["layers"][2][0]["params"][0]["value"], 3);
}

#[test]
fn test_swap_layers_unknown_layer() {
    let (temp_dir, path) = workspace(&swap_layout());
    let output = run_hrmkit(
        temp_dir.path(),
        &["swap-layers", "--input", path.to_str().unwrap(), "--modded", "Fancy"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Layer 'Fancy' not found"));
}

// ============================================================================
// remove-layer
// ============================================================================

#[test]
fn test_remove_layer_with_redirect() {
    let (temp_dir, path) = workspace(&target_layout());
    let output = run_hrmkit(
        temp_dir.path(),
        &[
            "remove-layer",
            "--input",
            path.to_str().unwrap(),
            "--layer",
            "Lower",
            "--redirect",
            "Base",
        ],
    );
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Removed layer 'Lower' (index 2)"));

    let layout = read_layout(&path);
    assert_eq!(layer_names(&layout), vec!["Base", "BaseModded", "Magic"]);
    // &lt 2 pointed at Lower and now points at Base
    assert_eq!(layout["layers"][0][2]["params"][0]["value"], 0);
    // Magic moved from 3 to 2
    assert_eq!(layout["combos"][0]["binding"]["params"][0]["value"], 2);
    assert_eq!(layout["combos"][0]["layers"], json!([0, 0]));
    assert_eq!(layout["inputListeners"][0]["nodes"][0]["layers"], json!([0, 2]));
}

#[test]
fn test_remove_referenced_layer_without_redirect_fails() {
    let (temp_dir, path) = workspace(&target_layout());
    let before = fs::read(&path).unwrap();

    let output = run_hrmkit(
        temp_dir.path(),
        &["remove-layer", "--input", path.to_str().unwrap(), "--layer", "Magic"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Layer index 3"));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_remove_unreferenced_layer() {
    let (temp_dir, path) = workspace(&target_layout());
    let output = run_hrmkit(
        temp_dir.path(),
        &[
            "remove-layer",
            "--input",
            path.to_str().unwrap(),
            "--layer",
            "BaseModded",
            "--json",
        ],
    );
    assert_eq!(output.status.code(), Some(0));

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["index"], 1);
    assert!(report["redirect"].is_null());

    let layout = read_layout(&path);
    assert_eq!(layer_names(&layout), vec!["Base", "Lower", "Magic"]);
    assert_eq!(layout["layers"][0][2]["params"][0]["value"], 1);
    assert_eq!(layout["layers"][1][0]["params"][0]["value"], 2);
    assert_eq!(layout["combos"][0]["layers"], json!([0, 1]));
}
