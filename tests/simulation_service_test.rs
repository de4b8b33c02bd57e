//! Tests for SimulationService

use rstest::rstest;

use seqtree::application::services::{SimulationParams, SimulationService};
use seqtree::application::LineageDocument;
use seqtree::config::Settings;
use seqtree::domain::{DeletionMode, GeneratorConfig, RandomGenerator};
use seqtree::util::testing;

fn params(depth: usize, children: usize) -> SimulationParams {
    SimulationParams {
        root_length: 40,
        depth,
        children,
        mutations: 6,
    }
}

#[rstest]
#[case(DeletionMode::Compacting, 1)]
#[case(DeletionMode::Exact, 2)]
#[case(DeletionMode::Compacting, 3)]
fn given_seed_when_simulating_then_every_node_reconstructs(
    #[case] mode: DeletionMode,
    #[case] seed: u64,
) {
    testing::init_test_setup();
    let mut generator = RandomGenerator::seeded(seed, GeneratorConfig::default()).unwrap();

    let tree = SimulationService::new(mode)
        .simulate(&mut generator, &params(4, 2))
        .unwrap();

    assert_eq!(tree.len(), 31);
    for (id, node) in tree.iter() {
        assert!(tree.reconstruct(id).is_ok(), "{} failed", node.name);
    }
}

#[test]
fn given_same_seed_when_simulating_twice_then_trees_identical() {
    let service = SimulationService::new(DeletionMode::Compacting);
    let run = |seed| {
        let mut generator = RandomGenerator::seeded(seed, GeneratorConfig::default()).unwrap();
        let tree = service.simulate(&mut generator, &params(3, 3)).unwrap();
        LineageDocument::from_tree(&tree)
    };

    assert_eq!(run(42), run(42));
}

#[test]
fn given_tiny_root_and_many_deletions_when_simulating_then_still_valid() {
    let config = GeneratorConfig {
        deletion_weight: 20,
        max_deletion_length: 5,
        ..GeneratorConfig::default()
    };
    let mut generator = RandomGenerator::seeded(9, config).unwrap();
    let shape = SimulationParams {
        root_length: 2,
        depth: 3,
        children: 2,
        mutations: 10,
    };

    let tree = SimulationService::new(DeletionMode::Exact)
        .simulate(&mut generator, &shape)
        .unwrap();

    for leaf in tree.leaves() {
        assert!(tree.reconstruct(leaf).is_ok());
    }
}

#[test]
fn given_settings_when_deriving_params_then_uses_simulation_section() {
    let settings = Settings::default();
    let params = SimulationParams::from(&settings.simulation);

    assert_eq!(params.depth, settings.simulation.depth);
    assert_eq!(params.children, settings.simulation.children);
    assert_eq!(params.root_length, settings.simulation.root_length);
}
