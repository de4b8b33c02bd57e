//! Growable symbol buffer with in-place and copying edit primitives.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::mutation::{self, Mutation};

/// How a deletion treats the storage left behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMode {
    /// Shift the tail left and keep the current capacity.
    #[default]
    Compacting,
    /// Copy into storage of the exact new size.
    Exact,
}

/// Broad classification of a sequence by its symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Dna,
    Rna,
    /// Only A, C and G: could be either nucleic acid.
    DnaOrRna,
    Protein,
    Other,
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SequenceKind::Dna => "DNA",
            SequenceKind::Rna => "RNA",
            SequenceKind::DnaOrRna => "DNA or RNA",
            SequenceKind::Protein => "protein",
            SequenceKind::Other => "other",
        };
        f.write_str(s)
    }
}

const PROTEIN_SYMBOLS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY*";

/// Ordered symbol buffer.
///
/// `len()` is the number of symbols, `capacity()` the allocated storage;
/// `capacity() >= len()` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Sequence {
    data: Vec<u8>,
    /// Free-form description, e.g. the FASTA header line.
    info: Option<String>,
}

impl Sequence {
    pub fn new(symbols: impl Into<Vec<u8>>) -> Self {
        Self {
            data: symbols.into(),
            info: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Replace the symbol at `position`.
    pub fn point_mutate(&mut self, position: usize, symbol: u8) -> DomainResult<()> {
        if let Some(reason) = mutation::point_violation(position, self.len()) {
            return Err(DomainError::invalid_mutation(
                Mutation::point(position, symbol),
                self.len(),
                reason,
            ));
        }
        self.data[position] = symbol;
        Ok(())
    }

    /// Insert `subsequence` before `position`; `position == len()` appends.
    pub fn insert(&mut self, position: usize, subsequence: &[u8]) -> DomainResult<()> {
        if let Some(reason) = mutation::insertion_violation(position, self.len()) {
            return Err(DomainError::invalid_mutation(
                Mutation::insertion(position, subsequence),
                self.len(),
                reason,
            ));
        }
        if subsequence.is_empty() {
            return Ok(());
        }
        self.data
            .try_reserve(subsequence.len())
            .map_err(|_| DomainError::AllocationFailure {
                requested: subsequence.len(),
            })?;
        self.data
            .splice(position..position, subsequence.iter().copied());
        Ok(())
    }

    /// Remove `count` symbols starting at `position`, keeping capacity.
    pub fn delete(&mut self, position: usize, count: usize) -> DomainResult<()> {
        Mutation::deletion(position, count).validate(self.len())?;
        if count == 0 {
            return Ok(());
        }
        self.data.drain(position..position + count);
        Ok(())
    }

    /// Remove `count` symbols starting at `position` and shrink storage to
    /// exactly the remaining length.
    pub fn delete_exact(&mut self, position: usize, count: usize) -> DomainResult<()> {
        Mutation::deletion(position, count).validate(self.len())?;
        if count == 0 {
            return Ok(());
        }
        let remaining = self.len() - count;
        let mut data = Vec::new();
        data.try_reserve_exact(remaining)
            .map_err(|_| DomainError::AllocationFailure {
                requested: remaining,
            })?;
        data.extend_from_slice(&self.data[..position]);
        data.extend_from_slice(&self.data[position + count..]);
        self.data = data;
        Ok(())
    }

    /// Apply `mutation` in place.
    ///
    /// The mutation is validated first; on error the buffer is unchanged.
    pub fn apply(&mut self, mutation: &Mutation, mode: DeletionMode) -> DomainResult<()> {
        trace!(%mutation, length = self.len(), "apply");
        match mutation {
            Mutation::Point { position, symbol } => self.point_mutate(*position, *symbol),
            Mutation::Insertion {
                position,
                subsequence,
            } => self.insert(*position, subsequence),
            Mutation::Deletion { position, count } => match mode {
                DeletionMode::Compacting => self.delete(*position, *count),
                DeletionMode::Exact => self.delete_exact(*position, *count),
            },
        }
    }

    /// Return a new buffer with `mutation` applied; `self` is untouched.
    ///
    /// The result is allocated at its exact final size.
    pub fn apply_immutable(&self, mutation: &Mutation) -> DomainResult<Sequence> {
        mutation.validate(self.len())?;
        let length = self.len() - mutation.removed() + mutation.added();

        let mut data = Vec::new();
        data.try_reserve_exact(length)
            .map_err(|_| DomainError::AllocationFailure { requested: length })?;

        match mutation {
            Mutation::Point { position, symbol } => {
                data.extend_from_slice(&self.data);
                data[*position] = *symbol;
            }
            Mutation::Insertion {
                position,
                subsequence,
            } => {
                data.extend_from_slice(&self.data[..*position]);
                data.extend_from_slice(subsequence);
                data.extend_from_slice(&self.data[*position..]);
            }
            Mutation::Deletion { position, count } => {
                data.extend_from_slice(&self.data[..*position]);
                data.extend_from_slice(&self.data[*position + *count..]);
            }
        }

        Ok(Sequence {
            data,
            info: self.info.clone(),
        })
    }

    /// Classify the sequence by the symbols it contains (case-insensitive).
    pub fn kind(&self) -> SequenceKind {
        let all_in = |set: &[u8]| self.data.iter().all(|c| set.contains(&c.to_ascii_uppercase()));

        if self.data.is_empty() {
            SequenceKind::Other
        } else if all_in(b"ACG") {
            SequenceKind::DnaOrRna
        } else if all_in(b"ACGT") {
            SequenceKind::Dna
        } else if all_in(b"ACGU") {
            SequenceKind::Rna
        } else if all_in(PROTEIN_SYMBOLS) {
            SequenceKind::Protein
        } else {
            SequenceKind::Other
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.data))
    }
}

impl From<&str> for Sequence {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for Sequence {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<Vec<u8>> for Sequence {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl FromIterator<u8> for Sequence {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<u8>>())
    }
}

impl PartialEq<str> for Sequence {
    fn eq(&self, other: &str) -> bool {
        self.data == other.as_bytes()
    }
}

impl PartialEq<&str> for Sequence {
    fn eq(&self, other: &&str) -> bool {
        self.data == other.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_valid_position_when_point_mutating_then_replaces_symbol() {
        let mut seq = Sequence::from("ATGC");
        seq.point_mutate(1, b'G').unwrap();
        assert_eq!(seq, "AGGC");
    }

    #[test]
    fn given_position_at_length_when_point_mutating_then_fails() {
        let mut seq = Sequence::from("ATGC");
        let err = seq.point_mutate(4, b'G').unwrap_err();
        assert!(err.is_invalid_mutation());
        assert_eq!(seq, "ATGC");
    }

    #[rstest]
    #[case(0, "GGATGC")]
    #[case(2, "ATGGGC")]
    #[case(4, "ATGCGG")]
    fn given_position_when_inserting_then_shifts_tail(#[case] pos: usize, #[case] expected: &str) {
        let mut seq = Sequence::from("ATGC");
        seq.insert(pos, b"GG").unwrap();
        assert_eq!(seq, expected);
    }

    #[test]
    fn given_position_past_end_when_inserting_then_fails_unchanged() {
        let mut seq = Sequence::from("ATGC");
        assert!(seq.insert(5, b"A").is_err());
        assert_eq!(seq, "ATGC");
    }

    #[test]
    fn given_compacting_delete_then_capacity_is_kept() {
        let mut seq = Sequence::from("ATGCATGC");
        let capacity = seq.capacity();
        seq.delete(2, 4).unwrap();
        assert_eq!(seq, "ATGC");
        assert_eq!(seq.capacity(), capacity);
    }

    #[test]
    fn given_exact_delete_then_capacity_shrinks_to_length() {
        let mut seq = Sequence::from("ATGCATGC");
        seq.delete_exact(2, 4).unwrap();
        assert_eq!(seq, "ATGC");
        assert_eq!(seq.capacity(), 4);
    }

    #[rstest]
    #[case(DeletionMode::Compacting)]
    #[case(DeletionMode::Exact)]
    fn given_deletion_overrunning_end_when_applying_then_fails_unchanged(#[case] mode: DeletionMode) {
        let mut seq = Sequence::from("ATGC");
        let err = seq.apply(&Mutation::deletion(3, 2), mode).unwrap_err();
        assert!(err.is_invalid_mutation());
        assert_eq!(seq, "ATGC");
    }

    #[rstest]
    #[case(DeletionMode::Compacting)]
    #[case(DeletionMode::Exact)]
    fn given_delete_then_reinsert_removed_content_then_content_is_preserved(#[case] mode: DeletionMode) {
        let original = Sequence::from("ATGCATGC");
        let mut seq = original.clone();
        let removed = seq.as_bytes()[3..6].to_vec();
        seq.apply(&Mutation::deletion(3, 3), mode).unwrap();
        seq.insert(3, &removed).unwrap();
        assert_eq!(seq, original);
    }

    #[test]
    fn given_zero_length_edits_then_buffer_is_unchanged() {
        let mut seq = Sequence::from("ATGC");
        seq.insert(2, b"").unwrap();
        seq.delete(4, 0).unwrap();
        seq.delete_exact(0, 0).unwrap();
        assert_eq!(seq, "ATGC");
    }

    #[test]
    fn given_mutation_when_applying_immutable_then_receiver_is_untouched() {
        let seq = Sequence::from("ATGC").with_info("parent");
        let child = seq.apply_immutable(&Mutation::insertion(2, "TT")).unwrap();
        assert_eq!(seq, "ATGC");
        assert_eq!(child, "ATTTGC");
        assert_eq!(child.capacity(), 6);
        assert_eq!(child.info(), Some("parent"));
    }

    #[rstest]
    #[case("ATGCATGC", SequenceKind::Dna)]
    #[case("AUGCAUGC", SequenceKind::Rna)]
    #[case("acggca", SequenceKind::DnaOrRna)]
    #[case("MKWVTFISLL", SequenceKind::Protein)]
    #[case("ATGU", SequenceKind::Other)]
    #[case("", SequenceKind::Other)]
    fn given_symbols_when_classifying_then_returns_kind(#[case] symbols: &str, #[case] kind: SequenceKind) {
        assert_eq!(Sequence::from(symbols).kind(), kind);
    }
}
