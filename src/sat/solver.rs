//! The common solver interface.

use crate::sat::assignment::Solutions;
use crate::sat::cnf::Cnf;

/// Solver options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Drop clauses holding both a literal and its complement during
    /// redundancy removal. Both settings find the same answers.
    pub eliminate_tautologies: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            eliminate_tautologies: true,
        }
    }
}

/// Counters collected during a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolutionStats {
    /// Candidate literals assumed.
    pub decisions: usize,
    /// Literals forced by unit clauses.
    pub propagations: usize,
    /// Assumptions that led to an empty clause.
    pub conflicts: usize,
    /// Search nodes abandoned or narrowed after a refuted child.
    pub backtracks: usize,
    /// Deepest search stack seen.
    pub max_depth: usize,
}

pub trait Solver {
    fn new(cnf: Cnf) -> Self;

    fn with_config(cnf: Cnf, config: SolverConfig) -> Self;

    /// Searches for a model. `None` means the formula is unsatisfiable; it is
    /// not an error.
    fn solve(&mut self) -> Option<Solutions>;

    /// The model found by the last call to `solve`, if any.
    fn solutions(&self) -> Option<&Solutions>;

    fn stats(&self) -> SolutionStats;
}
