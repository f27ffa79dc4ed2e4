//! Layout document I/O service.
//!
//! This module centralizes all document file operations, providing a
//! consistent interface for loading, saving and naming output files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::{models::Document, parser};

/// Service for managing layout document I/O operations.
pub struct DocumentService;

impl DocumentService {
    /// Loads a layout document from a JSON file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use hrmkit::services::DocumentService;
    ///
    /// let document = DocumentService::load(Path::new("layout.json"))?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<Document> {
        parser::parse_document(path)
            .with_context(|| format!("Failed to load layout from {}", path.display()))
    }

    /// Saves a layout document as JSON.
    ///
    /// This performs an atomic write using a temp file + rename pattern to ensure
    /// the file is never left in a corrupted state.
    pub fn save(document: &Document, path: &Path) -> Result<()> {
        parser::save_document(document, path)
            .with_context(|| format!("Failed to save layout to {}", path.display()))
    }

    /// Default output path for a merge into `target`: `<stem><suffix><ext>`.
    ///
    /// Targets without an extension get `.json`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use hrmkit::services::DocumentService;
    ///
    /// assert_eq!(
    ///     DocumentService::derived_output_path(Path::new("dir/Glove80.json"), "_with_hrm"),
    ///     PathBuf::from("dir/Glove80_with_hrm.json")
    /// );
    /// assert_eq!(
    ///     DocumentService::derived_output_path(Path::new("layout"), "_with_hrm"),
    ///     PathBuf::from("layout_with_hrm.json")
    /// );
    /// ```
    pub fn derived_output_path(target: &Path, suffix: &str) -> PathBuf {
        let stem = target
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = target
            .extension()
            .map_or_else(|| "json".to_string(), |ext| ext.to_string_lossy().into_owned());
        target.with_file_name(format!("{stem}{suffix}.{extension}"))
    }
}
