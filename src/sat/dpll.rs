//! A backtracking DPLL solver over named CNF formulas.
//!
//! The search keeps an explicit stack of nodes instead of recursing, so its
//! depth is bounded by memory rather than by the native stack. Each node
//! holds
//!
//! 1. the formula reduced under every assumption made so far,
//! 2. the distinct literals of that formula in clause order (the candidates)
//!    and a cursor into them,
//! 3. the assignment accumulated along the branch.
//!
//! Taking a branch assumes the next candidate literal with its own polarity,
//! applies it, and propagates unit clauses to a fixed point. A branch that
//! ends in an empty clause is refuted; its parent then knows the complement
//! of that candidate holds, narrows its own formula with it and moves on to
//! the next candidate whose variable still occurs. A node with no candidate
//! left is refuted in turn. Refuting the root means the formula is
//! unsatisfiable.
//!
//! Variables that no longer occur in the reduced formula are free and are
//! left out of the returned model.

use crate::logging::targets::DPLL;
use crate::sat::assignment::{Assignment, Solutions};
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use crate::sat::preprocessing::{Preprocessor, redundancy_chain};
use crate::sat::propagation::{apply_assumption, propagate_to_fixpoint};
use crate::sat::solver::{SolutionStats, Solver, SolverConfig};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone)]
struct SearchNode {
    cnf: Cnf,
    assignment: Assignment,
    candidates: Vec<Literal>,
    cursor: usize,
    live: FxHashSet<Variable>,
    /// The candidate assumed to create this node. `None` for the root.
    decision: Option<Literal>,
}

impl SearchNode {
    fn new(cnf: Cnf, assignment: Assignment, decision: Option<Literal>) -> Self {
        let candidates = cnf.literals();
        let live = candidates.iter().map(|lit| lit.variable().clone()).collect();
        Self {
            cnf,
            assignment,
            candidates,
            cursor: 0,
            live,
            decision,
        }
    }

    /// Replaces the formula with a narrower one, keeping the cursor.
    fn narrow(&mut self, cnf: Cnf, assignment: Assignment) {
        self.live = cnf.variables().into_iter().collect();
        self.cnf = cnf;
        self.assignment = assignment;
    }

    fn next_candidate(&mut self) -> Option<Literal> {
        while let Some(lit) = self.candidates.get(self.cursor) {
            self.cursor += 1;
            if self.live.contains(lit.variable()) {
                return Some(lit.clone());
            }
        }
        None
    }
}

enum Step {
    Satisfied(Assignment),
    Refuted,
    Open(Cnf, Assignment),
}

#[derive(Debug, Clone)]
pub struct Dpll {
    pub cnf: Cnf,
    pub config: SolverConfig,
    stats: SolutionStats,
    solution: Option<Solutions>,
}

impl Solver for Dpll {
    fn new(cnf: Cnf) -> Self {
        Self::with_config(cnf, SolverConfig::default())
    }

    fn with_config(cnf: Cnf, config: SolverConfig) -> Self {
        Self {
            cnf,
            config,
            stats: SolutionStats::default(),
            solution: None,
        }
    }

    fn solve(&mut self) -> Option<Solutions> {
        self.stats = SolutionStats::default();
        let solution = self.search();

        log::debug!(
            target: DPLL,
            "{} after {} decisions, {} conflicts, {} propagations",
            if solution.is_some() { "SAT" } else { "UNSAT" },
            self.stats.decisions,
            self.stats.conflicts,
            self.stats.propagations,
        );

        self.solution.clone_from(&solution);
        solution
    }

    fn solutions(&self) -> Option<&Solutions> {
        self.solution.as_ref()
    }

    fn stats(&self) -> SolutionStats {
        self.stats
    }
}

impl Dpll {
    fn search(&mut self) -> Option<Assignment> {
        // Deduplication happens once; assumptions never introduce repeats.
        let cnf = redundancy_chain(self.config.eliminate_tautologies).preprocess(&self.cnf);

        let mut stack = match self.simplify(&cnf, Assignment::new()) {
            Step::Satisfied(assignment) => return Some(assignment),
            Step::Refuted => return None,
            Step::Open(cnf, assignment) => vec![SearchNode::new(cnf, assignment, None)],
        };

        let mut refuted: Option<Literal> = None;

        loop {
            let depth = stack.len();
            let Some(node) = stack.last_mut() else {
                return None;
            };

            if let Some(failed) = refuted.take() {
                // The child assuming `failed` has no model, so its complement
                // holds in every model of this node.
                self.stats.backtracks += 1;
                let complement = failed.negated();
                let mut assignment = node.assignment.clone();
                assignment.assign(&complement);
                let reduced = apply_assumption(&node.cnf, [&complement]);

                match self.simplify(&reduced, assignment) {
                    Step::Satisfied(assignment) => return Some(assignment),
                    Step::Refuted => {
                        refuted = Self::abandon(&mut stack)?;
                        continue;
                    }
                    Step::Open(cnf, assignment) => node.narrow(cnf, assignment),
                }
            }

            let Some(candidate) = node.next_candidate() else {
                refuted = Self::abandon(&mut stack)?;
                continue;
            };

            self.stats.decisions += 1;
            log::trace!(target: DPLL, "Assume {candidate} at depth {depth}");

            let mut assignment = node.assignment.clone();
            assignment.assign(&candidate);
            let reduced = apply_assumption(&node.cnf, [&candidate]);

            match self.simplify(&reduced, assignment) {
                Step::Satisfied(assignment) => return Some(assignment),
                Step::Refuted => {
                    self.stats.conflicts += 1;
                    log::trace!(target: DPLL, "Conflict after {candidate}");
                    refuted = Some(candidate);
                }
                Step::Open(cnf, assignment) => {
                    stack.push(SearchNode::new(cnf, assignment, Some(candidate)));
                    self.stats.max_depth = self.stats.max_depth.max(depth + 1);
                }
            }
        }
    }

    /// Pops a refuted node. Returns the decision that created it, or `None`
    /// (through `?` in the caller) once the root itself is refuted.
    fn abandon(stack: &mut Vec<SearchNode>) -> Option<Option<Literal>> {
        let node = stack.pop()?;
        log::trace!(target: DPLL, "Backtrack from depth {}", stack.len() + 1);
        node.decision.map(Some)
    }

    /// Propagates unit clauses to a fixed point and classifies the result.
    fn simplify(&mut self, cnf: &Cnf, mut assignment: Assignment) -> Step {
        let (forced, reduced) = propagate_to_fixpoint(cnf);
        self.stats.propagations += forced.len();
        assignment.merge(&forced);

        if reduced.is_empty() {
            Step::Satisfied(assignment)
        } else if reduced.has_empty_clause() {
            Step::Refuted
        } else {
            Step::Open(reduced, assignment)
        }
    }
}

/// Finds a satisfying assignment for `cnf`, or `None` if there is none.
#[must_use]
pub fn solve(cnf: &Cnf) -> Option<Assignment> {
    Dpll::new(cnf.clone()).solve()
}
