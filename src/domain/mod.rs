//! Domain layer: sequences, mutations and the mutation tree
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod generator;
pub mod mutation;
pub mod sequence;
pub mod tree_traits;

pub use arena::{MutationTree, NodeId, TreeNode};
pub use error::{DomainError, DomainResult};
pub use generator::{GeneratorConfig, MutationGenerator, RandomGenerator};
pub use mutation::{Mutation, MutationKind, MutationList};
pub use sequence::{DeletionMode, Sequence, SequenceKind};
pub use tree_traits::TreeNodeConvert;
