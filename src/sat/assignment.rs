//! Variable assignments.
//!
//! An assignment grows monotonically along a search branch: bindings are
//! merged in, never overwritten. Variables it does not mention are free.

use crate::sat::literal::{Literal, Variable};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::fmt::{self, Display};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(FxHashMap<Variable, bool>);

/// The model handed back by a solver.
pub type Solutions = Assignment;

impl Assignment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the literal's variable to the literal's polarity unless it is
    /// already bound. Returns the value the variable ends up with.
    pub fn assign(&mut self, literal: &Literal) -> bool {
        *self
            .0
            .entry(Rc::clone(literal.variable()))
            .or_insert(literal.polarity())
    }

    /// Merges `other` into `self`, keeping existing bindings on conflict.
    pub fn merge(&mut self, other: &Self) {
        for (var, &value) in &other.0 {
            self.0.entry(Rc::clone(var)).or_insert(value);
        }
    }

    #[must_use]
    pub fn get(&self, variable: &str) -> Option<bool> {
        self.0.get(variable).copied()
    }

    #[must_use]
    pub fn literal_value(&self, literal: &Literal) -> Option<bool> {
        self.get(literal.name()).map(|b| b == literal.polarity())
    }

    #[must_use]
    pub fn contains(&self, variable: &str) -> bool {
        self.0.contains_key(variable)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, bool)> {
        self.0.iter().map(|(k, &v)| (k, v))
    }

    /// The assignment as literals, sorted by variable name.
    #[must_use]
    pub fn to_literals(&self) -> Vec<Literal> {
        self.0
            .iter()
            .map(|(var, &value)| Literal::new(Rc::clone(var), value))
            .sorted()
            .collect()
    }

    /// Variables bound to `true`, sorted by name.
    #[must_use]
    pub fn positive_variables(&self) -> Vec<&Variable> {
        self.0
            .iter()
            .filter(|&(_, &value)| value)
            .map(|(var, _)| var)
            .sorted()
            .collect()
    }
}

impl FromIterator<Literal> for Assignment {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        let mut assignment = Self::new();
        for lit in iter {
            assignment.assign(&lit);
        }
        assignment
    }
}

impl<S: Into<Variable>> FromIterator<(S, bool)> for Assignment {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        iter.into_iter().map(Literal::from).collect()
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_literals().iter().join(" "))
    }
}
