//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent a source hierarchy that cannot form a consistent store.
/// Construction rejects these up front instead of producing a broken tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node name differs only by case: {first} vs {second}")]
    CaseCollision { first: String, second: String },

    #[error("duplicate node under the same parent: {0}")]
    DuplicateNode(String),

    #[error("node {name} declared under {first} and {second}")]
    ConflictingParent {
        name: String,
        first: String,
        second: String,
    },

    #[error("parent {parent} of {name} is not a node")]
    MissingParent { name: String, parent: String },

    #[error("invalid magnitude for {key}: {value}")]
    InvalidMagnitude { key: String, value: f64 },

    #[error("cycle detected in hierarchy: {0}")]
    CycleDetected(String),

    #[error("reserved node name: {0}")]
    ReservedName(String),
}

/// Result type for tree construction.
pub type DomainResult<T> = Result<T, DomainError>;
