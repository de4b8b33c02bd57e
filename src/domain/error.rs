//! Domain-level errors (no I/O concerns)

use thiserror::Error;

use crate::domain::mutation::Mutation;

/// Domain errors represent violations of sequence and tree invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid mutation {mutation} for sequence of length {length}: {reason}")]
    InvalidMutation {
        mutation: Mutation,
        length: usize,
        reason: String,
    },

    #[error("mutation #{index} of node '{node}' cannot be applied: {source}")]
    InvalidMutationAt {
        node: String,
        index: usize,
        source: Box<DomainError>,
    },

    #[error("cannot grow sequence buffer by {requested} symbols")]
    AllocationFailure { requested: usize },

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("duplicate node name: {0}")]
    DuplicateNode(String),

    #[error("invalid mutation notation: {0}")]
    InvalidNotation(String),

    #[error("invalid generator config: {0}")]
    InvalidGeneratorConfig(String),
}

impl DomainError {
    pub fn invalid_mutation(mutation: Mutation, length: usize, reason: impl Into<String>) -> Self {
        DomainError::InvalidMutation {
            mutation,
            length,
            reason: reason.into(),
        }
    }

    /// True for `InvalidMutation`, including one wrapped with node context.
    pub fn is_invalid_mutation(&self) -> bool {
        match self {
            DomainError::InvalidMutation { .. } => true,
            DomainError::InvalidMutationAt { source, .. } => source.is_invalid_mutation(),
            _ => false,
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
