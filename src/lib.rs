//! hrmkit Library
//!
//! Core functionality for the hrmkit CLI: a typed model of Glove80 layout
//! documents, reference resolution across behaviors and layers, legacy
//! home-row-mod renaming, document-wide layer reindexing, and the merge that
//! ties them together.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod parser;
pub mod services;

// Re-export commonly used types
pub use error::{MergeError, MergeResult};
pub use models::Document;
