//! Random symbols, sequences and mutations.
//!
//! Generators are explicit objects handed to whoever needs randomness; a
//! seeded generator reproduces the same stream on every run.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::mutation::{Mutation, MutationKind};
use crate::domain::sequence::Sequence;

/// Source of random content for simulation drivers.
pub trait MutationGenerator {
    fn random_symbol(&mut self) -> u8;

    fn random_sequence(&mut self, length: usize) -> Sequence {
        (0..length).map(|_| self.random_symbol()).collect()
    }

    /// A mutation that is valid for a sequence of `current_length` symbols.
    fn next_mutation(&mut self, current_length: usize) -> Mutation;
}

/// Knobs for [`RandomGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub alphabet: Vec<u8>,
    pub max_insertion_length: usize,
    pub max_deletion_length: usize,
    pub point_weight: u32,
    pub insertion_weight: u32,
    pub deletion_weight: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            alphabet: b"ACGT".to_vec(),
            max_insertion_length: 3,
            max_deletion_length: 3,
            point_weight: 8,
            insertion_weight: 1,
            deletion_weight: 1,
        }
    }
}

const KINDS: [MutationKind; 3] = [
    MutationKind::Point,
    MutationKind::Insertion,
    MutationKind::Deletion,
];

/// Uniform symbols from an alphabet, mutation kinds drawn by weight.
///
/// An empty sequence only ever receives insertions.
#[derive(Debug, Clone)]
pub struct RandomGenerator<R: Rng> {
    rng: R,
    config: GeneratorConfig,
    kinds: WeightedIndex<u32>,
}

impl<R: Rng> RandomGenerator<R> {
    pub fn new(rng: R, config: GeneratorConfig) -> DomainResult<Self> {
        if config.alphabet.is_empty() {
            return Err(DomainError::InvalidGeneratorConfig(
                "alphabet is empty".to_string(),
            ));
        }
        if let Some(&symbol) = config.alphabet.iter().find(|b| !b.is_ascii_graphic()) {
            return Err(DomainError::InvalidGeneratorConfig(format!(
                "alphabet symbol {:#04x} is not printable ASCII",
                symbol
            )));
        }
        if config.max_insertion_length == 0 || config.max_deletion_length == 0 {
            return Err(DomainError::InvalidGeneratorConfig(
                "maximum insertion and deletion lengths must be at least 1".to_string(),
            ));
        }
        let kinds = WeightedIndex::new([
            config.point_weight,
            config.insertion_weight,
            config.deletion_weight,
        ])
        .map_err(|e| DomainError::InvalidGeneratorConfig(format!("mutation weights: {}", e)))?;

        Ok(Self { rng, config, kinds })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn random_insert(&mut self, current_length: usize) -> Mutation {
        let position = self.rng.gen_range(0..=current_length);
        let length = self.rng.gen_range(1..=self.config.max_insertion_length);
        let subsequence: Vec<u8> = (0..length).map(|_| self.random_symbol()).collect();
        Mutation::insertion(position, subsequence)
    }
}

impl RandomGenerator<StdRng> {
    /// Reproducible generator backed by `StdRng`.
    pub fn seeded(seed: u64, config: GeneratorConfig) -> DomainResult<Self> {
        Self::new(StdRng::seed_from_u64(seed), config)
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy(config: GeneratorConfig) -> DomainResult<Self> {
        Self::new(StdRng::from_entropy(), config)
    }
}

impl<R: Rng> MutationGenerator for RandomGenerator<R> {
    fn random_symbol(&mut self) -> u8 {
        let i = self.rng.gen_range(0..self.config.alphabet.len());
        self.config.alphabet[i]
    }

    fn next_mutation(&mut self, current_length: usize) -> Mutation {
        if current_length == 0 {
            return self.random_insert(current_length);
        }
        match KINDS[self.kinds.sample(&mut self.rng)] {
            MutationKind::Point => {
                let position = self.rng.gen_range(0..current_length);
                let symbol = self.random_symbol();
                Mutation::point(position, symbol)
            }
            MutationKind::Insertion => self.random_insert(current_length),
            MutationKind::Deletion => {
                let position = self.rng.gen_range(0..current_length);
                let max = self.config.max_deletion_length.min(current_length - position);
                let count = self.rng.gen_range(1..=max);
                Mutation::deletion(position, count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sequence::DeletionMode;
    use rstest::rstest;

    #[test]
    fn given_same_seed_when_generating_then_streams_match() {
        let mut a = RandomGenerator::seeded(42, GeneratorConfig::default()).unwrap();
        let mut b = RandomGenerator::seeded(42, GeneratorConfig::default()).unwrap();
        assert_eq!(a.random_sequence(50), b.random_sequence(50));
        for len in [0, 1, 10, 100] {
            assert_eq!(a.next_mutation(len), b.next_mutation(len));
        }
    }

    #[test]
    fn given_alphabet_when_generating_sequence_then_uses_only_its_symbols() {
        let config = GeneratorConfig {
            alphabet: b"ACGU".to_vec(),
            ..GeneratorConfig::default()
        };
        let mut generator = RandomGenerator::seeded(7, config).unwrap();
        let seq = generator.random_sequence(200);
        assert_eq!(seq.len(), 200);
        assert!(seq.as_bytes().iter().all(|c| b"ACGU".contains(c)));
    }

    #[test]
    fn given_running_sequence_when_generating_then_every_mutation_applies() {
        let mut generator = RandomGenerator::seeded(1, GeneratorConfig::default()).unwrap();
        let mut seq = generator.random_sequence(5);
        for _ in 0..2_000 {
            let m = generator.next_mutation(seq.len());
            seq.apply(&m, DeletionMode::Compacting).unwrap();
        }
    }

    #[test]
    fn given_empty_sequence_when_generating_then_inserts() {
        let config = GeneratorConfig {
            insertion_weight: 0,
            ..GeneratorConfig::default()
        };
        let mut generator = RandomGenerator::seeded(3, config).unwrap();
        assert_eq!(generator.next_mutation(0).kind(), MutationKind::Insertion);
    }

    #[test]
    fn given_zero_weights_when_creating_then_fails() {
        let config = GeneratorConfig {
            point_weight: 0,
            insertion_weight: 0,
            deletion_weight: 0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            RandomGenerator::seeded(0, config),
            Err(DomainError::InvalidGeneratorConfig(_))
        ));
    }

    #[test]
    fn given_empty_alphabet_when_creating_then_fails() {
        let config = GeneratorConfig {
            alphabet: Vec::new(),
            ..GeneratorConfig::default()
        };
        assert!(RandomGenerator::seeded(0, config).is_err());
    }

    #[rstest]
    #[case(b"A T".to_vec())]
    #[case(b"AC\n".to_vec())]
    #[case(vec![b'A', 0xC3])]
    fn given_unprintable_alphabet_when_creating_then_fails(#[case] alphabet: Vec<u8>) {
        let config = GeneratorConfig {
            alphabet,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            RandomGenerator::seeded(0, config),
            Err(DomainError::InvalidGeneratorConfig(_))
        ));
    }
}
