//! Error taxonomy for document transformations.
//!
//! Every variant carries the offending name or index so a failure can be
//! diagnosed without re-running the operation.

/// Kind of entity a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A named layer
    Layer,
    /// A hold-tap or macro in the behavior registry
    Behavior,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layer => write!(f, "Layer"),
            Self::Behavior => write!(f, "Behavior"),
        }
    }
}

/// Errors raised by the document model and the merge/rename/reindex services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// A layer or behavior lookup failed
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What was looked up
        kind: EntityKind,
        /// The name that did not resolve
        name: String,
    },

    /// Requested values have no binding on the source layer
    #[error("The following values were not found on layer '{layer}': {}", missing.join(", "))]
    BindingNotFound {
        /// Source layer that was searched
        layer: String,
        /// Every requested value that had no binding on the layer
        missing: Vec<String>,
    },

    /// A binding or behavior names an undefined behavior
    #[error("Behavior '{name}' referenced by '{referenced_by}' is not defined")]
    DanglingReference {
        /// The undefined behavior name
        name: String,
        /// Binding or behavior holding the reference
        referenced_by: String,
    },

    /// Two source names map to the same canonical name
    #[error("Behaviors '{first}' and '{second}' both rename to '{canonical}'")]
    NameCollision {
        /// First source name
        first: String,
        /// Second source name
        second: String,
        /// Shared canonical name
        canonical: String,
    },

    /// The destination defines a different behavior under the same name
    #[error("Behavior '{name}' already exists in the target with a different definition")]
    TargetNameConflict {
        /// Canonical name already taken in the destination
        name: String,
    },

    /// A layer index points past the end of the layer list
    #[error("Layer index {index} referenced by {context} does not resolve")]
    DanglingLayerReference {
        /// The unresolved layer index
        index: usize,
        /// Where the reference lives
        context: String,
    },

    /// A layer index argument outside the document's layer list
    #[error("Layer index {index} is out of range for {operation} ({count} layers)")]
    LayerIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of layers in the document
        count: usize,
        /// Operation that was asked for the index
        operation: String,
    },

    /// A new layer order that does not move every layer exactly once
    #[error("Layer order {order:?} is not a permutation of {count} layers")]
    InvalidLayerOrder {
        /// Requested new index of each layer
        order: Vec<usize>,
        /// Number of layers in the document
        count: usize,
    },

    /// A layer does not have the document's position count
    #[error("Layer '{layer}' has {actual} positions, expected {expected}")]
    LayerSizeMismatch {
        /// Layer being inserted or compared
        layer: String,
        /// Position count of the document
        expected: usize,
        /// Position count of the offending layer
        actual: usize,
    },

    /// A layer with this name is already present
    #[error("Layer '{0}' already exists")]
    DuplicateLayer(String),

    /// A binding write past the end of a layer
    #[error("Position {position} is out of range for layer '{layer}' ({len} positions)")]
    PositionOutOfRange {
        /// Layer being written
        layer: String,
        /// Requested position
        position: usize,
        /// Number of positions on the layer
        len: usize,
    },
}

impl MergeError {
    /// Shorthand for a missing layer.
    pub fn layer_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Layer,
            name: name.into(),
        }
    }

    /// Shorthand for a missing behavior.
    pub fn behavior_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Behavior,
            name: name.into(),
        }
    }
}

/// Result alias for document transformations.
pub type MergeResult<T> = std::result::Result<T, MergeError>;
