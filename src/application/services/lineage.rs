//! Lineage service
//!
//! Loads lineage documents and answers queries about the resulting tree.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::lineage::{LineageDocument, RootSource, RootSpec};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{MutationList, MutationTree, Sequence, SequenceKind};
use crate::infrastructure::traits::{FileSystem, SequenceReader};
use crate::util::path::resolve_against;

/// Structural and sequence facts about one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStats {
    pub name: String,
    /// Hops to the root
    pub depth: usize,
    /// Edges in the subtree below the node
    pub edges: usize,
    /// Leaves in the subtree below the node
    pub leaves: usize,
    /// Mutations authored at the node itself
    pub own_mutations: usize,
    /// Mutations in the whole subtree, node included
    pub subtree_mutations: usize,
    /// Length of the reconstructed sequence
    pub length: usize,
    pub kind: SequenceKind,
}

impl fmt::Display for NodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "node:              {}", self.name)?;
        writeln!(f, "depth:             {}", self.depth)?;
        writeln!(f, "edges:             {}", self.edges)?;
        writeln!(f, "leaves:            {}", self.leaves)?;
        writeln!(f, "own mutations:     {}", self.own_mutations)?;
        writeln!(f, "subtree mutations: {}", self.subtree_mutations)?;
        writeln!(f, "length:            {}", self.length)?;
        write!(f, "kind:              {}", self.kind)
    }
}

/// Service for loading mutation trees and reconstructing their sequences.
pub struct LineageService {
    fs: Arc<dyn FileSystem>,
    reader: Arc<dyn SequenceReader>,
}

impl LineageService {
    /// Create a new lineage service.
    pub fn new(fs: Arc<dyn FileSystem>, reader: Arc<dyn SequenceReader>) -> Self {
        Self { fs, reader }
    }

    /// Load a lineage document from disk and build its tree.
    ///
    /// A FASTA root path is resolved against the document's directory.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<MutationTree> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read lineage document", path)?;
        self.parse(&content, path.parent())
            .map_err(|e| e.at_path(path))
    }

    /// Build a tree from lineage document text.
    pub fn parse(&self, content: &str, base_dir: Option<&Path>) -> ApplicationResult<MutationTree> {
        let doc = LineageDocument::parse(content)?;
        let root = self.resolve_root(&doc.root, base_dir)?;
        debug!(root = %doc.root.name, length = root.len(), nodes = doc.nodes.len(), "parsed lineage");
        doc.build(root)
    }

    fn resolve_root(&self, spec: &RootSpec, base_dir: Option<&Path>) -> ApplicationResult<Sequence> {
        match spec.source()? {
            RootSource::Inline(sequence) => Ok(sequence),
            RootSource::Fasta { path, index } => {
                let path = resolve_against(base_dir, &path);
                let sequence = self
                    .reader
                    .read(&path, index)
                    .with_path_context("read root sequence", &path)?;
                Ok(spec.annotate(sequence))
            }
        }
    }

    /// Serialize a tree as a lineage document.
    pub fn render<T>(&self, tree: &MutationTree<T>) -> ApplicationResult<String> {
        LineageDocument::from_tree(tree).to_toml()
    }

    /// Write a tree as a lineage document.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save<T>(&self, tree: &MutationTree<T>, path: &Path) -> ApplicationResult<()> {
        let text = self.render(tree)?;
        self.fs
            .write(path, &text)
            .with_path_context("write lineage document", path)
    }

    /// Reconstruct the sequence at the named node.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn reconstruct(&self, tree: &MutationTree, name: &str) -> ApplicationResult<Sequence> {
        let node = tree.require(name)?;
        Ok(tree.reconstruct(node)?)
    }

    /// Reconstruct every leaf in parallel, in pre-order.
    ///
    /// The first failing leaf aborts the whole call.
    #[instrument(level = "debug", skip_all)]
    pub fn reconstruct_leaves(&self, tree: &MutationTree) -> ApplicationResult<Vec<(String, Sequence)>> {
        let leaves = tree.leaves();
        let sequences = tree.reconstruct_many(&leaves);

        leaves
            .into_iter()
            .zip(sequences)
            .map(|(id, result)| -> ApplicationResult<(String, Sequence)> {
                let name = tree.node(id)?.name.clone();
                Ok((name, result?))
            })
            .collect()
    }

    /// Flattened mutations below `name`, or below the root when `None`.
    pub fn flatten(&self, tree: &MutationTree, name: Option<&str>) -> ApplicationResult<MutationList> {
        let node = match name {
            Some(name) => tree.require(name)?,
            None => tree.root(),
        };
        Ok(tree.flatten(node)?)
    }

    /// Facts about `name`, or about the root when `None`.
    pub fn stats(&self, tree: &MutationTree, name: Option<&str>) -> ApplicationResult<NodeStats> {
        let id = match name {
            Some(name) => tree.require(name)?,
            None => tree.root(),
        };
        let node = tree.node(id)?;
        let sequence = tree.reconstruct(id)?;

        Ok(NodeStats {
            name: node.name.clone(),
            depth: tree.depth_to_root(id)?,
            edges: tree.edge_count(id)?,
            leaves: tree.leaf_count(id)?,
            own_mutations: node.mutations.len(),
            subtree_mutations: tree.flatten(id)?.len(),
            length: sequence.len(),
            kind: sequence.kind(),
        })
    }
}
