//! Lineage documents: a TOML description of a mutation tree.
//!
//! ```toml
//! [root]
//! name = "root"
//! sequence = "ATGCATGC"
//!
//! [[node]]
//! name = "X"
//! parent = "root"
//! mutations = ["sub@1:G"]
//! ```
//!
//! Nodes may be listed in any order; each parent must be defined somewhere
//! in the document.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{MutationList, MutationTree, Sequence};

fn default_root_name() -> String {
    "root".to_string()
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Where the root sequence comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSpec {
    #[serde(default = "default_root_name")]
    pub name: String,
    /// Inline symbols
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
    /// FASTA file, relative paths resolve against the document's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fasta: Option<PathBuf>,
    /// Record index within the FASTA file
    #[serde(default, skip_serializing_if = "is_zero")]
    pub index: usize,
    /// Description line; for a FASTA root it replaces the record header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Resolved form of [`RootSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource {
    Inline(Sequence),
    Fasta { path: PathBuf, index: usize },
}

impl RootSpec {
    /// Inline symbols are normalized like FASTA records: whitespace dropped,
    /// upper-cased.
    pub fn source(&self) -> ApplicationResult<RootSource> {
        match (&self.sequence, &self.fasta) {
            (Some(symbols), None) => Ok(RootSource::Inline(
                self.annotate(Sequence::new(
                    symbols
                        .bytes()
                        .filter(|b| !b.is_ascii_whitespace())
                        .map(|b| b.to_ascii_uppercase())
                        .collect::<Vec<u8>>(),
                )),
            )),
            (None, Some(path)) => Ok(RootSource::Fasta {
                path: path.clone(),
                index: self.index,
            }),
            (Some(_), Some(_)) => Err(ApplicationError::lineage(
                "root sets both 'sequence' and 'fasta'",
            )),
            (None, None) => Err(ApplicationError::lineage(
                "root needs either 'sequence' or 'fasta'",
            )),
        }
    }

    /// Attach the configured info line, if any.
    pub fn annotate(&self, sequence: Sequence) -> Sequence {
        match &self.info {
            Some(info) => sequence.with_info(info.clone()),
            None => sequence,
        }
    }
}

/// One non-root node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub parent: String,
    #[serde(default)]
    pub mutations: MutationList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageDocument {
    pub root: RootSpec,
    #[serde(default, rename = "node", skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeSpec>,
}

impl LineageDocument {
    pub fn parse(content: &str) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::lineage(e.to_string()))
    }

    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string(self).map_err(|e| ApplicationError::lineage(e.to_string()))
    }

    /// Describe an existing tree; nodes are listed in pre-order.
    pub fn from_tree<T>(tree: &MutationTree<T>) -> Self {
        let root_name = tree
            .get_node(tree.root())
            .map(|n| n.name.clone())
            .unwrap_or_else(default_root_name);

        let nodes = tree
            .iter()
            .filter_map(|(_, node)| {
                let parent = tree.get_node(node.parent?)?;
                Some(NodeSpec {
                    name: node.name.clone(),
                    parent: parent.name.clone(),
                    mutations: node.mutations.clone(),
                })
            })
            .collect();

        Self {
            root: RootSpec {
                name: root_name,
                sequence: Some(tree.root_sequence().to_string()),
                fasta: None,
                index: 0,
                info: tree.root_sequence().info().map(str::to_string),
            },
            nodes,
        }
    }

    /// Build the tree on top of an already resolved root sequence.
    ///
    /// Mutation lists are stored as written; they are checked only when a
    /// node is reconstructed.
    pub fn build(&self, root_sequence: Sequence) -> ApplicationResult<MutationTree> {
        let mut tree = MutationTree::new(self.root.name.clone(), root_sequence);

        let mut children: HashMap<&str, Vec<&NodeSpec>> = HashMap::new();
        for spec in &self.nodes {
            children.entry(spec.parent.as_str()).or_default().push(spec);
        }

        let mut queue = VecDeque::from([(self.root.name.as_str(), tree.root())]);
        let mut placed = 0;
        while let Some((name, id)) = queue.pop_front() {
            for spec in children.remove(name).unwrap_or_default() {
                let child = tree.add_child(id, spec.name.clone(), spec.mutations.clone())?;
                placed += 1;
                queue.push_back((spec.name.as_str(), child));
            }
        }

        if placed < self.nodes.len() {
            let mut orphans: Vec<&str> = children
                .values()
                .flatten()
                .map(|spec| spec.name.as_str())
                .collect();
            orphans.sort_unstable();
            return Err(ApplicationError::lineage(format!(
                "nodes not reachable from root '{}' (unknown parent or cycle): {}",
                self.root.name,
                orphans.join(", ")
            )));
        }

        debug!(nodes = tree.len(), "built tree from lineage document");
        Ok(tree)
    }
}
