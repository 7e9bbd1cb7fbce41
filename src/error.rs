//! Error type shared by every automaton operation.

/// Errors returned by automaton construction, compilation and matching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcError {
    /// Patterns must contain at least one byte.
    #[error("pattern must not be empty")]
    EmptyPattern,

    /// The node arena is full and the growth policy forbids enlarging it.
    #[error("node arena is full ({capacity} nodes)")]
    CapacityExhausted { capacity: usize },

    /// Search or replacement was attempted before `compile`.
    #[error("automaton is not compiled")]
    NotCompiled,

    /// `compile` was called on an automaton that is already compiled.
    #[error("automaton is already compiled")]
    AlreadyCompiled,

    /// In-place replacement was given a text length past the end of its buffer.
    #[error("text length {len} exceeds buffer capacity {capacity}")]
    LengthExceedsCapacity { len: usize, capacity: usize },

    /// The output buffer could not be reserved.
    #[error("failed to allocate {requested} bytes for output")]
    Allocation { requested: usize },
}

/// Result type for automaton operations.
pub type Result<T> = std::result::Result<T, AcError>;
