//! Simulation service
//!
//! Grows random mutation trees for testing and demos.

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::SimulationConfig;
use crate::domain::{DeletionMode, MutationGenerator, MutationList, MutationTree};

/// Largest tree `simulate` agrees to build.
pub const MAX_SIMULATED_NODES: usize = 1_000_000;

/// Shape of a simulated tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationParams {
    pub root_length: usize,
    /// Levels below the root
    pub depth: usize,
    /// Children per internal node
    pub children: usize,
    /// Mutations per branch
    pub mutations: usize,
}

impl From<&SimulationConfig> for SimulationParams {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            root_length: config.root_length,
            depth: config.depth,
            children: config.children,
            mutations: config.mutations,
        }
    }
}

impl SimulationParams {
    /// Total number of nodes, root included; `None` once the running total
    /// passes `limit`.
    pub fn bounded_node_count(&self, limit: usize) -> Option<usize> {
        let mut total = 0usize;
        let mut level_nodes = 1usize;
        for level in 0..=self.depth {
            if level > 0 {
                level_nodes = level_nodes.checked_mul(self.children)?;
                if level_nodes == 0 {
                    break;
                }
            }
            total = total.checked_add(level_nodes).filter(|&t| t <= limit)?;
        }
        Some(total)
    }
}

/// Builds complete random trees.
///
/// Each branch's mutations are drawn against a working copy of the parent's
/// sequence that is edited in place as the mutations are drawn, so every
/// recorded position is valid in the parent-relative frame.
pub struct SimulationService {
    mode: DeletionMode,
}

impl SimulationService {
    pub fn new(mode: DeletionMode) -> Self {
        Self { mode }
    }

    /// Grow a tree with `params.children` children per node down to
    /// `params.depth` levels. Nodes are named `n1`, `n1.2`, `n1.2.1`, ...
    #[instrument(level = "debug", skip(self, generator))]
    pub fn simulate<G: MutationGenerator + ?Sized>(
        &self,
        generator: &mut G,
        params: &SimulationParams,
    ) -> ApplicationResult<MutationTree> {
        match params.bounded_node_count(MAX_SIMULATED_NODES) {
            Some(_) => {}
            None => {
                return Err(ApplicationError::Config {
                    message: format!(
                        "simulation of depth {} with {} children exceeds {} nodes",
                        params.depth, params.children, MAX_SIMULATED_NODES
                    ),
                })
            }
        }

        let root_sequence = generator.random_sequence(params.root_length);
        let mut tree = MutationTree::new("root", root_sequence.clone());
        let mut frontier = vec![(tree.root(), String::new(), root_sequence)];

        for level in 1..=params.depth {
            let mut next = Vec::with_capacity(frontier.len() * params.children);
            for (parent, prefix, sequence) in frontier {
                for i in 1..=params.children {
                    let name = if prefix.is_empty() {
                        format!("n{}", i)
                    } else {
                        format!("{}.{}", prefix, i)
                    };

                    let mut working = sequence.clone();
                    let mut mutations = MutationList::new();
                    for _ in 0..params.mutations {
                        let mutation = generator.next_mutation(working.len());
                        working.apply(&mutation, self.mode)?;
                        mutations.push(mutation);
                    }

                    let child = tree.add_child(parent, name.clone(), mutations)?;
                    next.push((child, name, working));
                }
            }
            debug!(level, nodes = next.len(), "simulated level");
            frontier = next;
        }

        Ok(tree)
    }
}
