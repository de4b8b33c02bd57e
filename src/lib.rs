//! seqtree: reconstruct sequences from a tree of mutations.
//!
//! A [`domain::MutationTree`] stores a root sequence and, at every node, the
//! mutations that turn the parent's sequence into the node's. Sequences are
//! never stored below the root; they are rebuilt on demand by replaying the
//! lineage from the root.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
