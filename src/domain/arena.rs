use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use rayon::prelude::*;
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::mutation::MutationList;
use crate::domain::sequence::Sequence;

/// Handle of a node inside a [`MutationTree`].
pub type NodeId = Index;

/// Tree node carrying the mutations that separate it from its parent.
#[derive(Debug)]
pub struct TreeNode<T = ()> {
    /// Unique name within the tree
    pub name: String,
    /// Opaque caller data, dropped with the tree
    pub payload: Option<T>,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<NodeId>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<NodeId>,
    /// Mutations relative to the parent's reconstructed sequence
    pub mutations: MutationList,
}

impl<T> TreeNode<T> {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_internal(&self) -> bool {
        !self.is_leaf() && !self.is_root()
    }
}

impl<T> fmt::Display for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Root sequence plus an arena-based tree of mutation lists.
///
/// Nodes own their children through index lists; the parent index is only
/// used to walk upwards. Nodes are never removed.
#[derive(Debug)]
pub struct MutationTree<T = ()> {
    arena: Arena<TreeNode<T>>,
    root: NodeId,
    sequence: Sequence,
    names: HashMap<String, NodeId>,
}

impl<T> MutationTree<T> {
    /// Create a tree holding only a root node with an empty mutation list.
    pub fn new(root_name: impl Into<String>, sequence: Sequence) -> Self {
        let name = root_name.into();
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            name: name.clone(),
            payload: None,
            parent: None,
            children: Vec::new(),
            mutations: MutationList::new(),
        });
        let mut names = HashMap::new();
        names.insert(name, root);
        Self {
            arena,
            root,
            sequence,
            names,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode<T>> {
        self.arena.get(id)
    }

    /// Mutable access to a node's payload; structure stays read-only.
    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.arena.get_mut(id).and_then(|n| n.payload.as_mut())
    }

    /// Like [`get_node`](Self::get_node) but a missing node is an error.
    pub fn node(&self, id: NodeId) -> DomainResult<&TreeNode<T>> {
        self.arena
            .get(id)
            .ok_or_else(|| DomainError::MalformedTree(format!("dangling node reference {:?}", id)))
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Look up a node by name, failing with `NodeNotFound`.
    pub fn require(&self, name: &str) -> DomainResult<NodeId> {
        self.find(name)
            .ok_or_else(|| DomainError::NodeNotFound(name.to_string()))
    }

    /// Attach a new child under `parent`.
    ///
    /// The mutation list is stored as given; it is only checked against a
    /// sequence when a descendant is reconstructed.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        mutations: impl Into<MutationList>,
    ) -> DomainResult<NodeId> {
        self.insert_child(parent, name.into(), mutations.into(), None)
    }

    pub fn add_child_with_payload(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        mutations: impl Into<MutationList>,
        payload: T,
    ) -> DomainResult<NodeId> {
        self.insert_child(parent, name.into(), mutations.into(), Some(payload))
    }

    #[instrument(level = "trace", skip(self, mutations, payload))]
    fn insert_child(
        &mut self,
        parent: NodeId,
        name: String,
        mutations: MutationList,
        payload: Option<T>,
    ) -> DomainResult<NodeId> {
        self.node(parent)?;
        if self.names.contains_key(&name) {
            return Err(DomainError::DuplicateNode(name));
        }

        let node_idx = self.arena.insert(TreeNode {
            name: name.clone(),
            payload,
            parent: Some(parent),
            children: Vec::new(),
            mutations,
        });
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.push(node_idx);
        }
        self.names.insert(name, node_idx);
        Ok(node_idx)
    }

    /// Nodes from the root down to `node` inclusive.
    ///
    /// Fails with `MalformedTree` on a dangling parent reference or when the
    /// walk visits more nodes than the tree holds.
    #[instrument(level = "trace", skip(self))]
    pub fn lineage(&self, node: NodeId) -> DomainResult<Vec<NodeId>> {
        let mut chain = vec![node];
        let mut current = self.node(node)?;
        while let Some(parent) = current.parent {
            if chain.len() > self.arena.len() {
                return Err(DomainError::MalformedTree(format!(
                    "cycle above node '{}'",
                    self.node(node)?.name
                )));
            }
            current = self.node(parent)?;
            chain.push(parent);
        }
        if chain.last() != Some(&self.root) {
            return Err(DomainError::MalformedTree(format!(
                "node '{}' is not connected to the root",
                self.node(node)?.name
            )));
        }
        chain.reverse();
        Ok(chain)
    }

    /// Hops from `node` up to the root; 0 for the root itself.
    pub fn depth_to_root(&self, node: NodeId) -> DomainResult<usize> {
        Ok(self.lineage(node)?.len() - 1)
    }

    /// Rebuild the full sequence at `node`.
    ///
    /// Every node's list on the root-to-node path is applied in order, each
    /// mutation against the sequence produced by all mutations before it.
    /// Each step allocates a new buffer, so nothing shared is modified.
    #[instrument(level = "debug", skip(self))]
    pub fn reconstruct(&self, node: NodeId) -> DomainResult<Sequence> {
        let mut current = self.sequence.clone();
        for id in self.lineage(node)? {
            let step = self.node(id)?;
            for (index, mutation) in step.mutations.iter().enumerate() {
                current = current.apply_immutable(mutation).map_err(|e| {
                    DomainError::InvalidMutationAt {
                        node: step.name.clone(),
                        index,
                        source: Box::new(e),
                    }
                })?;
            }
            trace!(node = %step.name, length = current.len(), "applied node mutations");
        }
        debug!(length = current.len(), "reconstructed");
        Ok(current)
    }

    /// All mutations in the subtree of `node`, pre-order: the node's own list
    /// first, then each child's flattened list in child order.
    pub fn flatten(&self, node: NodeId) -> DomainResult<MutationList> {
        self.node(node)?;
        let mut all = MutationList::new();
        for (_, n) in self.iter_from(node) {
            all.extend_from(&n.mutations);
        }
        Ok(all)
    }

    /// Number of edges in the subtree rooted at `node`.
    pub fn edge_count(&self, node: NodeId) -> DomainResult<usize> {
        self.node(node)?;
        Ok(self.iter_from(node).count() - 1)
    }

    /// Number of childless nodes in the subtree rooted at `node`.
    pub fn leaf_count(&self, node: NodeId) -> DomainResult<usize> {
        self.node(node)?;
        Ok(self.iter_from(node).filter(|(_, n)| n.is_leaf()).count())
    }

    /// Leaves of the whole tree, in pre-order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn is_leaf(&self, node: NodeId) -> DomainResult<bool> {
        Ok(self.node(node)?.is_leaf())
    }

    pub fn is_root(&self, node: NodeId) -> DomainResult<bool> {
        Ok(self.node(node)?.is_root())
    }

    pub fn is_internal(&self, node: NodeId) -> DomainResult<bool> {
        Ok(self.node(node)?.is_internal())
    }

    /// Longest root-to-leaf path counted in nodes.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((node_idx, level)) = stack.pop() {
            if let Some(node) = self.get_node(node_idx) {
                deepest = deepest.max(level);
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Pre-order over the whole tree.
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order over the subtree rooted at `node`.
    pub fn iter_from(&self, node: NodeId) -> TreeIterator<'_, T> {
        TreeIterator::new(self, node)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self)
    }

    /// Newick rendering, branch length = number of mutations on the branch.
    ///
    /// `((B:1,C:2)A:1)root;`
    pub fn newick(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![NewickStep::Open(self.root)];
        while let Some(step) = stack.pop() {
            match step {
                NewickStep::Open(node_idx) => {
                    let Some(node) = self.get_node(node_idx) else {
                        continue;
                    };
                    if node.children.is_empty() {
                        write_newick_label(node, &mut out);
                        continue;
                    }
                    out.push('(');
                    stack.push(NewickStep::Close(node_idx));
                    for (i, &child) in node.children.iter().enumerate().rev() {
                        stack.push(NewickStep::Open(child));
                        if i > 0 {
                            stack.push(NewickStep::Separator);
                        }
                    }
                }
                NewickStep::Separator => out.push(','),
                NewickStep::Close(node_idx) => {
                    out.push(')');
                    if let Some(node) = self.get_node(node_idx) {
                        write_newick_label(node, &mut out);
                    }
                }
            }
        }
        out.push(';');
        out
    }
}

enum NewickStep {
    Open(NodeId),
    Separator,
    Close(NodeId),
}

fn write_newick_label<T>(node: &TreeNode<T>, out: &mut String) {
    out.push_str(&newick_label(&node.name));
    if !node.is_root() {
        out.push_str(&format!(":{}", node.mutations.len()));
    }
}

impl<T: Sync> MutationTree<T> {
    /// Reconstruct several nodes in parallel; results keep the input order.
    #[instrument(level = "debug", skip_all, fields(count = nodes.len()))]
    pub fn reconstruct_many(&self, nodes: &[NodeId]) -> Vec<DomainResult<Sequence>> {
        nodes.par_iter().map(|&node| self.reconstruct(node)).collect()
    }
}

/// Quote a Newick label when it contains reserved characters.
fn newick_label(name: &str) -> String {
    const RESERVED: &[char] = &['(', ')', '[', ']', ',', ':', ';', '\'', ' ', '\t'];
    if name.contains(RESERVED) {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}

pub struct TreeIterator<'a, T> {
    tree: &'a MutationTree<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(tree: &'a MutationTree<T>, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (NodeId, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    tree: &'a MutationTree<T>,
    stack: Vec<(NodeId, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(tree: &'a MutationTree<T>) -> Self {
        Self {
            tree,
            stack: vec![(tree.root(), false)],
        }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (NodeId, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
