#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conjunctive normal form formulas.
//!
//! A `Cnf` is a conjunction of clauses. It is immutable by convention: each
//! transform (redundancy removal, assumption application) builds a new
//! formula. Clauses sit behind `Rc`, so a transform that leaves a clause alone
//! shares it with its input instead of copying it. This keeps every node of
//! the backtracking search cheap to hold onto.
//!
//! An empty formula is trivially satisfied. A formula containing an empty
//! clause is proven false.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, ParseLiteralError, Variable};
use itertools::Itertools;
use std::fmt::{self, Display};
use std::rc::Rc;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    pub clauses: Vec<Rc<Clause>>,
}

impl Cnf {
    pub fn new<I, C>(clauses: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Clause>,
    {
        Self {
            clauses: clauses.into_iter().map(|c| Rc::new(c.into())).collect(),
        }
    }

    #[must_use]
    pub const fn from_shared(clauses: Vec<Rc<Clause>>) -> Self {
        Self { clauses }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// True when no clauses remain, i.e. the formula is trivially satisfied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().map(|clause| &**clause)
    }

    pub fn add_clause(&mut self, clause: impl Into<Clause>) {
        self.clauses.push(Rc::new(clause.into()));
    }

    #[must_use]
    pub fn has_empty_clause(&self) -> bool {
        self.iter().any(Clause::is_empty)
    }

    /// Distinct literals in clause order, first occurrence wins.
    #[must_use]
    pub fn literals(&self) -> Vec<Literal> {
        self.iter().flat_map(Clause::iter).unique().cloned().collect()
    }

    /// Distinct variables in clause order, first occurrence wins.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.iter()
            .flat_map(Clause::iter)
            .map(Literal::variable)
            .unique()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.variables().len()
    }

    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.iter().map(Clause::len).sum()
    }

    /// Three valued evaluation: `Some(true)` when every clause has a true
    /// literal, `Some(false)` when some clause has only false literals, and
    /// `None` when the partial assignment decides neither.
    #[must_use]
    pub fn evaluate(&self, assignment: &Assignment) -> Option<bool> {
        let mut undecided = false;
        for clause in self.iter() {
            let mut clause_undecided = false;
            let mut satisfied = false;
            for lit in clause.iter() {
                match assignment.literal_value(lit) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => clause_undecided = true,
                }
            }
            if satisfied {
                continue;
            }
            if !clause_undecided {
                return Some(false);
            }
            undecided = true;
        }
        if undecided { None } else { Some(true) }
    }

    /// Checks a model, treating variables it does not mention as false.
    #[must_use]
    pub fn verify(&self, assignment: &Assignment) -> bool {
        self.iter().all(|clause| {
            clause
                .iter()
                .any(|lit| assignment.get(lit.variable()).unwrap_or(false) == lit.polarity())
        })
    }
}

impl<C: Into<Clause>> FromIterator<C> for Cnf {
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<C: Into<Clause>> From<Vec<C>> for Cnf {
    fn from(clauses: Vec<C>) -> Self {
        Self::new(clauses)
    }
}

/// One clause per line, literals separated by whitespace.
impl Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for clause in self.iter() {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCnfError {
    #[error("line {line}: {source}")]
    Literal {
        line: usize,
        #[source]
        source: ParseLiteralError,
    },
}

impl FromStr for Cnf {
    type Err = ParseCnfError;

    /// Parses the textual form: one clause per line, whitespace separated
    /// literals, `-` or `!` for negation. Lines starting with `#` are comments.
    /// Blank lines are skipped; write an explicit empty clause as a line
    /// holding only `()`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cnf = Self::default();
        for (idx, line) in s.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed == "()" {
                cnf.add_clause(Clause::empty());
                continue;
            }

            let clause: Clause = trimmed
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<Literal>().map_err(|source| ParseCnfError::Literal {
                        line: idx + 1,
                        source,
                    })
                })
                .collect::<Result<_, _>>()?;
            cnf.add_clause(clause);
        }
        Ok(cnf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_first_seen_order() {
        let cnf = Cnf::from(vec![
            vec![("a", true), ("b", false)],
            vec![("b", false), ("a", false)],
        ]);
        assert_eq!(
            cnf.literals(),
            vec![
                Literal::new("a", true),
                Literal::new("b", false),
                Literal::new("a", false)
            ]
        );
        assert_eq!(cnf.num_vars(), 2);
        assert_eq!(cnf.num_literals(), 4);
    }

    #[test]
    fn test_empty_formula_vs_empty_clause() {
        let trivially_true = Cnf::default();
        assert!(trivially_true.is_empty());
        assert!(!trivially_true.has_empty_clause());
        assert_eq!(trivially_true.evaluate(&Assignment::new()), Some(true));

        let mut contradiction = Cnf::default();
        contradiction.add_clause(Clause::empty());
        assert!(!contradiction.is_empty());
        assert!(contradiction.has_empty_clause());
        assert_eq!(contradiction.evaluate(&Assignment::new()), Some(false));
    }

    #[test]
    fn test_evaluate_partial() {
        let cnf = Cnf::from(vec![vec![("a", true), ("b", true)], vec![("c", false)]]);
        let mut assignment = Assignment::new();
        assignment.assign(&Literal::new("a", true));
        assert_eq!(cnf.evaluate(&assignment), None);
        assignment.assign(&Literal::new("c", true));
        assert_eq!(cnf.evaluate(&assignment), Some(false));
    }

    #[test]
    fn test_verify_defaults_missing_to_false() {
        let cnf = Cnf::from(vec![vec![("a", false)], vec![("b", true), ("c", false)]]);
        let mut assignment = Assignment::new();
        assignment.assign(&Literal::new("b", true));
        assert!(cnf.verify(&assignment));
    }

    #[test]
    fn test_parse_text() {
        let cnf: Cnf = "# comment\na -b\n\n!c\n()\n".parse().unwrap();
        assert_eq!(cnf.len(), 3);
        assert_eq!(cnf.clauses[1].literals[0], Literal::new("c", false));
        assert!(cnf.clauses[2].is_empty());
        assert_eq!(cnf.to_string(), "a -b\n-c\n\n");
    }

    #[test]
    fn test_parse_text_error_reports_line() {
        let err = "a\nb --c\n".parse::<Cnf>().unwrap_err();
        assert!(matches!(err, ParseCnfError::Literal { line: 2, .. }));
    }
}
