#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A disjunction of literals.
//!
//! The empty clause is a contradiction. A clause holding a literal and its
//! complement is a tautology.

use crate::sat::literal::Literal;
use core::ops::Index;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::fmt::{self, Display};

pub type LiteralStorage = SmallVec<[Literal; 8]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    pub literals: LiteralStorage,
}

impl Clause {
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn contains(&self, literal: &Literal) -> bool {
        self.literals.contains(literal)
    }

    #[must_use]
    pub fn is_tautology(&self) -> bool {
        let mut seen = FxHashSet::default();
        for lit in self.iter() {
            if seen.contains(&lit.negated()) {
                return true;
            }
            seen.insert(lit);
        }
        false
    }

    /// Drops repeated literals, keeping the first occurrence of each.
    #[must_use]
    pub fn dedup(&self) -> Self {
        Self::new(self.iter().unique().cloned())
    }

    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.iter().duplicates().next().is_some()
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Self {
            literals: LiteralStorage::from_vec(literals),
        }
    }
}

impl From<Vec<i32>> for Clause {
    fn from(literals: Vec<i32>) -> Self {
        literals.into_iter().map(Literal::from_i32).collect()
    }
}

impl<S: Into<crate::sat::literal::Variable>> From<Vec<(S, bool)>> for Clause {
    fn from(literals: Vec<(S, bool)>) -> Self {
        literals.into_iter().map(Literal::from).collect()
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(name: &str, polarity: bool) -> Literal {
        Literal::new(name, polarity)
    }

    #[test]
    fn test_new() {
        let clause = Clause::from(vec![1, 2, 3]);
        assert_eq!(clause.len(), 3);
        assert_eq!(clause[0], Literal::from(1));
    }

    #[test]
    fn test_unit_and_empty() {
        assert!(Clause::from(vec![("a", true)]).is_unit());
        assert!(Clause::empty().is_empty());
        assert!(!Clause::empty().is_unit());
    }

    #[test]
    fn test_tautology() {
        let clause = Clause::new([lit("a", true), lit("b", true), lit("a", false)]);
        assert!(clause.is_tautology());

        let clause = Clause::new([lit("a", true), lit("a", true)]);
        assert!(!clause.is_tautology());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let clause = Clause::new([
            lit("b", false),
            lit("a", true),
            lit("b", false),
            lit("a", true),
        ]);
        assert!(clause.has_duplicates());

        let deduped = clause.dedup();
        assert_eq!(deduped, Clause::new([lit("b", false), lit("a", true)]));
        assert!(!deduped.has_duplicates());
    }

    #[test]
    fn test_display() {
        let clause = Clause::new([lit("a", true), lit("b", false)]);
        assert_eq!(clause.to_string(), "a -b");
    }
}
