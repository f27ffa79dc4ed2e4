//! Reading and writing layout documents as JSON.

use crate::models::Document;
use anyhow::{Context, Result};
use std::path::Path;

/// Parses a layout document from a JSON file.
pub fn parse_document(path: &Path) -> Result<Document> {
    // Check if file exists first to provide better error message
    if !path.exists() {
        anyhow::bail!(
            "Layout file not found: {}\n\n\
             Please check the file path and try again.",
            path.display()
        );
    }

    if !path.is_file() {
        anyhow::bail!(
            "Path is not a file: {}\n\n\
            Please provide a path to a layout (.json) file.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file: {}", path.display()))?;

    parse_document_str(&content)
        .with_context(|| format!("Failed to parse layout file: {}", path.display()))
}

/// Parses a layout document from a JSON string and validates its structure.
pub fn parse_document_str(content: &str) -> Result<Document> {
    let document: Document =
        serde_json::from_str(content).context("Invalid layout JSON")?;
    document.validate()?;
    Ok(document)
}

/// Serializes a document as 2-space indented JSON with a trailing newline.
pub fn serialize_document(document: &Document) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(document).context("Failed to serialize layout to JSON")?;
    json.push('\n');
    Ok(json)
}

/// Writes a document to `path` atomically.
pub fn save_document(document: &Document, path: &Path) -> Result<()> {
    let json = serialize_document(document)?;
    atomic_write(path, &json)
}

/// Writes content to a file atomically using temp file + rename.
fn atomic_write(path: &Path, content: &str) -> Result<()> {
    // Create temporary file path
    let temp_path = path.with_extension("json.tmp");

    // Write to temp file
    std::fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write to temporary file: {}", temp_path.display()))?;

    // Atomic rename
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}
