use std::collections::HashMap;

use termtree::Tree;

use crate::domain::arena::{MutationTree, NodeId};

/// Levels shown below the root; deeper subtrees collapse into one summary line.
pub const MAX_RENDER_DEPTH: usize = 256;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label(name: &str, mutations: usize) -> String {
    match mutations {
        0 => name.to_string(),
        1 => format!("{} (1 mutation)", name),
        n => format!("{} ({} mutations)", name, n),
    }
}

impl<T> TreeNodeConvert for MutationTree<T> {
    fn to_tree_string(&self) -> Tree<String> {
        // Pre-order down to the render limit; reversed, every node comes
        // after all of its descendants.
        let mut visible = Vec::new();
        let mut stack = vec![(self.root(), 0)];
        while let Some((node_idx, level)) = stack.pop() {
            let Some(node) = self.get_node(node_idx) else {
                continue;
            };
            visible.push((node_idx, level));
            if level < MAX_RENDER_DEPTH {
                stack.extend(node.children.iter().rev().map(|&child| (child, level + 1)));
            }
        }

        let mut built: HashMap<NodeId, Tree<String>> = HashMap::with_capacity(visible.len());
        for &(node_idx, level) in visible.iter().rev() {
            let Some(node) = self.get_node(node_idx) else {
                continue;
            };
            let mut subtree = Tree::new(label(&node.name, node.mutations.len()));
            if level < MAX_RENDER_DEPTH {
                subtree.leaves = node
                    .children
                    .iter()
                    .filter_map(|child| built.remove(child))
                    .collect();
            } else if !node.children.is_empty() {
                let hidden = self.iter_from(node_idx).count() - 1;
                subtree.push(Tree::new(format!("... {} more nodes", hidden)));
            }
            built.insert(node_idx, subtree);
        }

        let mut root = built
            .remove(&self.root())
            .unwrap_or_else(|| Tree::new("<missing>".to_string()));
        root.root = format!("{} [{} bp]", root.root, self.root_sequence().len());
        root
    }
}
