//! Reading and writing Glove80 layout JSON files.

pub mod document;

// Re-export commonly used functions
pub use document::{parse_document, parse_document_str, save_document, serialize_document};
