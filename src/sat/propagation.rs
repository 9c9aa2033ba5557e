#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Assumption application and unit propagation.
//!
//! `apply_assumption` is the only operation that shrinks a formula; the other
//! functions here drive it with the literals forced by unit clauses.

use crate::logging::targets::PROPAGATION;
use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use rustc_hash::FxHashSet;
use std::rc::Rc;

/// Reduces `cnf` under the given assumptions.
///
/// A clause holding an assumed literal is satisfied and dropped. Otherwise
/// every literal falsified by an assumption is stripped. A clause stripped of
/// all its literals stays in the result as the empty clause, so the caller
/// can tell "proven false" (contains `[]`) from "trivially true" (no
/// clauses). Clauses that mention no assumed variable are shared with the
/// input unchanged.
#[must_use]
pub fn apply_assumption<'a, I>(cnf: &Cnf, assumptions: I) -> Cnf
where
    I: IntoIterator<Item = &'a Literal>,
{
    let satisfied: FxHashSet<&Literal> = assumptions.into_iter().collect();
    if satisfied.is_empty() {
        return cnf.clone();
    }
    let falsified: FxHashSet<Literal> = satisfied.iter().map(|lit| lit.negated()).collect();

    let mut clauses = Vec::with_capacity(cnf.len());
    for clause in &cnf.clauses {
        if clause.iter().any(|lit| satisfied.contains(lit)) {
            continue;
        }

        if clause.iter().any(|lit| falsified.contains(lit)) {
            let reduced: Clause = clause
                .iter()
                .filter(|lit| !falsified.contains(*lit))
                .cloned()
                .collect();
            clauses.push(Rc::new(reduced));
        } else {
            clauses.push(Rc::clone(clause));
        }
    }

    Cnf::from_shared(clauses)
}

/// The result of one unit propagation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPass {
    /// Literals forced by the unit clauses found in this pass.
    pub forced: Assignment,
    /// The formula reduced under `forced`.
    pub cnf: Cnf,
    /// Whether any unit clause was found.
    pub changed: bool,
}

/// One pass of unit propagation.
///
/// All unit clauses are collected into a single batch. When two unit clauses
/// disagree on a variable the first one wins the batch; applying it turns the
/// other into the empty clause, which the caller then sees as a contradiction.
#[must_use]
pub fn unit_propagate(cnf: &Cnf) -> UnitPass {
    let mut forced = Assignment::new();
    let mut batch = Vec::new();

    for clause in cnf.iter().filter(|c| c.is_unit()) {
        let lit = &clause[0];
        if !forced.contains(lit.name()) {
            forced.assign(lit);
            batch.push(lit.clone());
        }
    }

    if batch.is_empty() {
        return UnitPass {
            forced,
            cnf: cnf.clone(),
            changed: false,
        };
    }

    log::trace!(target: PROPAGATION, "Forced {} literals", batch.len());

    UnitPass {
        cnf: apply_assumption(cnf, &batch),
        forced,
        changed: true,
    }
}

/// Repeats `unit_propagate` until no unit clause remains, returning every
/// forced binding and the fully reduced formula. Stops early once an empty
/// clause appears.
#[must_use]
pub fn propagate_to_fixpoint(cnf: &Cnf) -> (Assignment, Cnf) {
    let mut assignment = Assignment::new();
    let mut current = cnf.clone();

    loop {
        let pass = unit_propagate(&current);
        assignment.merge(&pass.forced);
        current = pass.cnf;
        if !pass.changed || current.has_empty_clause() {
            return (assignment, current);
        }
    }
}
