//! Mutation values and ordered mutation lists.
//!
//! A mutation's position always refers to the sequence as it is immediately
//! before that mutation is applied.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::OnceLock;

use itertools::Itertools;
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::sequence::Sequence;

/// Discriminant of a [`Mutation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Point,
    Insertion,
    Deletion,
}

/// One edit of a sequence.
///
/// Text form: `sub@<pos>:<symbol>`, `ins@<pos>:<symbols>`, `del@<pos>:<count>`.
/// Symbols outside printable ASCII, and the characters `%`, `,` and space,
/// are written as `%XX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mutation {
    /// Substitute the symbol at `position`. Requires `position < length`.
    Point { position: usize, symbol: u8 },
    /// Insert before `position`. Requires `position <= length`.
    Insertion { position: usize, subsequence: Vec<u8> },
    /// Remove `count` symbols from `position`. Requires `position + count <= length`.
    Deletion { position: usize, count: usize },
}

pub(crate) fn point_violation(position: usize, length: usize) -> Option<String> {
    (position >= length).then(|| format!("position {} is not below length {}", position, length))
}

pub(crate) fn insertion_violation(position: usize, length: usize) -> Option<String> {
    (position > length).then(|| format!("position {} is past the end ({})", position, length))
}

pub(crate) fn deletion_violation(position: usize, count: usize, length: usize) -> Option<String> {
    match position.checked_add(count) {
        Some(end) if end <= length => None,
        _ => Some(format!(
            "deleting {} from position {} overruns length {}",
            count, position, length
        )),
    }
}

impl Mutation {
    pub fn point(position: usize, symbol: u8) -> Self {
        Mutation::Point { position, symbol }
    }

    pub fn insertion(position: usize, subsequence: impl AsRef<[u8]>) -> Self {
        Mutation::Insertion {
            position,
            subsequence: subsequence.as_ref().to_vec(),
        }
    }

    pub fn deletion(position: usize, count: usize) -> Self {
        Mutation::Deletion { position, count }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Point { .. } => MutationKind::Point,
            Mutation::Insertion { .. } => MutationKind::Insertion,
            Mutation::Deletion { .. } => MutationKind::Deletion,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Mutation::Point { position, .. }
            | Mutation::Insertion { position, .. }
            | Mutation::Deletion { position, .. } => *position,
        }
    }

    /// Number of symbols this mutation adds.
    pub fn added(&self) -> usize {
        match self {
            Mutation::Insertion { subsequence, .. } => subsequence.len(),
            _ => 0,
        }
    }

    /// Number of symbols this mutation removes.
    pub fn removed(&self) -> usize {
        match self {
            Mutation::Deletion { count, .. } => *count,
            _ => 0,
        }
    }

    /// Net change in sequence length.
    pub fn length_delta(&self) -> isize {
        self.added() as isize - self.removed() as isize
    }

    /// Check this mutation against a sequence of `length` symbols.
    pub fn validate(&self, length: usize) -> DomainResult<()> {
        let violation = match self {
            Mutation::Point { position, .. } => point_violation(*position, length),
            Mutation::Insertion { position, .. } => insertion_violation(*position, length),
            Mutation::Deletion { position, count } => deletion_violation(*position, *count, length),
        };
        match violation {
            Some(reason) => Err(DomainError::invalid_mutation(self.clone(), length, reason)),
            None => Ok(()),
        }
    }
}

/// Bytes escaped in the text form; non-ASCII bytes are always escaped.
const NOTATION_ESCAPES: &AsciiSet = &CONTROLS.add(b' ').add(b'%').add(b',');

fn encode_symbols(symbols: &[u8]) -> impl fmt::Display + '_ {
    percent_encode(symbols, NOTATION_ESCAPES)
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Point { position, symbol } => {
                write!(f, "sub@{}:{}", position, encode_symbols(std::slice::from_ref(symbol)))
            }
            Mutation::Insertion {
                position,
                subsequence,
            } => write!(f, "ins@{}:{}", position, encode_symbols(subsequence)),
            Mutation::Deletion { position, count } => write!(f, "del@{}:{}", position, count),
        }
    }
}

fn notation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(sub|ins|del)@(\d+):([[:graph:]]*)$").expect("mutation notation regex")
    })
}

impl FromStr for Mutation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidNotation(s.to_string());
        let caps = notation_regex().captures(s.trim()).ok_or_else(invalid)?;
        let position: usize = caps[2].parse().map_err(|_| invalid())?;
        let arg = &caps[3];
        let symbols = || percent_decode_str(arg).collect::<Vec<u8>>();

        match &caps[1] {
            "sub" => match symbols().as_slice() {
                [symbol] => Ok(Mutation::point(position, *symbol)),
                _ => Err(invalid()),
            },
            "ins" => Ok(Mutation::insertion(position, symbols())),
            "del" => arg
                .parse()
                .map(|count| Mutation::deletion(position, count))
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Mutation {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Mutation> for String {
    fn from(m: Mutation) -> Self {
        m.to_string()
    }
}

/// Mutations authored at one node, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationList(Vec<Mutation>);

impl MutationList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.0.push(mutation);
    }

    pub fn extend_from(&mut self, other: &MutationList) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Net change in sequence length after the whole list.
    pub fn length_delta(&self) -> isize {
        self.0.iter().map(Mutation::length_delta).sum()
    }

    /// Apply every mutation in order to a copy of `sequence`.
    pub fn apply_to(&self, sequence: &Sequence) -> DomainResult<Sequence> {
        self.0
            .iter()
            .try_fold(sequence.clone(), |current, m| current.apply_immutable(m))
    }

    pub fn into_vec(self) -> Vec<Mutation> {
        self.0
    }
}

impl Deref for MutationList {
    type Target = [Mutation];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Mutation>> for MutationList {
    fn from(v: Vec<Mutation>) -> Self {
        Self(v)
    }
}

impl FromIterator<Mutation> for MutationList {
    fn from_iter<I: IntoIterator<Item = Mutation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MutationList {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MutationList {
    type Item = &'a Mutation;
    type IntoIter = std::slice::Iter<'a, Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for MutationList {
    type Err = DomainError;

    /// Parse a comma- or whitespace-separated list of mutations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for MutationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sub@1:G", Mutation::point(1, b'G'))]
    #[case("ins@8:TTA", Mutation::insertion(8, "TTA"))]
    #[case("ins@0:", Mutation::insertion(0, ""))]
    #[case("del@0:2", Mutation::deletion(0, 2))]
    fn given_notation_when_parsing_then_returns_mutation(#[case] text: &str, #[case] expected: Mutation) {
        let parsed: Mutation = text.parse().unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), text);
    }

    #[rstest]
    #[case(Mutation::insertion(1, "A C"), "ins@1:A%20C")]
    #[case(Mutation::point(1, 0xC3), "sub@1:%C3")]
    #[case(Mutation::point(0, b'%'), "sub@0:%25")]
    #[case(Mutation::insertion(3, ",\tx"), "ins@3:%2C%09x")]
    #[case(Mutation::point(2, b' '), "sub@2:%20")]
    fn given_unprintable_symbols_when_writing_notation_then_escapes_and_parses_back(
        #[case] mutation: Mutation,
        #[case] text: &str,
    ) {
        assert_eq!(mutation.to_string(), text);
        assert_eq!(text.parse::<Mutation>().unwrap(), mutation);
    }

    #[test]
    fn given_escaped_symbols_in_list_when_parsing_then_separators_are_not_split() {
        let list: MutationList = vec![
            Mutation::insertion(0, "A,B"),
            Mutation::point(1, b' '),
        ]
        .into();
        let parsed: MutationList = list.to_string().parse().unwrap();
        assert_eq!(parsed, list);
    }

    #[rstest]
    #[case("sub@1:GG")]
    #[case("sub@1:%41%42")]
    #[case("sub@1:")]
    #[case("del@1:x")]
    #[case("swap@1:2")]
    #[case("del@-1:2")]
    #[case("ins@1:A C")]
    fn given_bad_notation_when_parsing_then_fails(#[case] text: &str) {
        let err = text.parse::<Mutation>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidNotation(_)));
    }

    #[rstest]
    #[case(Mutation::point(7, b'A'), 8, true)]
    #[case(Mutation::point(8, b'A'), 8, false)]
    #[case(Mutation::insertion(8, "A"), 8, true)]
    #[case(Mutation::insertion(9, "A"), 8, false)]
    #[case(Mutation::deletion(6, 2), 8, true)]
    #[case(Mutation::deletion(7, 2), 8, false)]
    #[case(Mutation::deletion(8, 0), 8, true)]
    #[case(Mutation::deletion(1, usize::MAX), 8, false)]
    fn given_length_when_validating_then_checks_bounds(
        #[case] mutation: Mutation,
        #[case] length: usize,
        #[case] valid: bool,
    ) {
        assert_eq!(mutation.validate(length).is_ok(), valid);
    }

    #[test]
    fn given_list_when_applying_then_positions_follow_running_state() {
        // The deletion position refers to the sequence after the insertion.
        let list: MutationList = "ins@0:GG, del@2:1".parse().unwrap();
        let result = list.apply_to(&Sequence::from("ATGC")).unwrap();
        assert_eq!(result, "GGTGC");
        assert_eq!(list.length_delta(), 1);
    }

    #[test]
    fn given_list_when_serializing_then_uses_notation() {
        #[derive(Serialize, Deserialize)]
        struct Doc {
            mutations: MutationList,
        }
        let doc = Doc {
            mutations: vec![Mutation::point(1, b'G'), Mutation::deletion(0, 2)].into(),
        };
        let text = toml::to_string(&doc).unwrap();
        assert!(text.contains(r#"mutations = ["sub@1:G", "del@0:2"]"#));
        let back: Doc = toml::from_str(&text).unwrap();
        assert_eq!(back.mutations, doc.mutations);
    }
}
