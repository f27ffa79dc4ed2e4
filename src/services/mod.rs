//! Service layer for business logic.
//!
//! Services operate on an in-memory [`Document`](crate::models::Document):
//! resolving references, renaming behaviors, shifting layer indices and
//! merging home-row mods between layouts.

pub mod documents;
pub mod layer_ops;
pub mod layer_refs;
pub mod merge;
pub mod naming;
pub mod reindex;
pub mod rename;
pub mod resolver;

// Re-export commonly used types and functions
pub use documents::DocumentService;
pub use merge::{merge, MergeOptions, MergeReport, MergeRequest};
pub use naming::NamingScheme;
pub use rename::RenamePlan;
