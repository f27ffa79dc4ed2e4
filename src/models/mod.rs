//! Data models for layout documents, layers, bindings and behaviors.
//!
//! This module contains the in-memory shape of a Glove80 layout document.
//! Models are independent of file I/O and of the merge logic.

pub mod behavior;
pub mod binding;
pub mod builtins;
pub mod document;
pub mod layer_params;

// Re-export all model types
pub use behavior::{Behavior, HoldTap, HoldTapSlot, Macro};
pub use binding::{Binding, Param, ParamValue};
pub use builtins::BuiltinBehaviors;
pub use document::{Combo, Document};
pub use layer_params::{LayerParam, LayerParams};
