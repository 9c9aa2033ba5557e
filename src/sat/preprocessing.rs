//! Redundancy removal run once before the search starts.
//!
//! Each pass is a `Preprocessor`; `PreprocessorChain` folds a formula through
//! a sequence of them. `remove_redundancy` is the chain the solver uses.

use crate::logging::targets::PREPROCESSING;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use std::fmt::Debug;
use std::rc::Rc;
use std::sync::Arc;

pub trait Preprocessor {
    fn preprocess(&self, cnf: &Cnf) -> Cnf;
}

impl Debug for PreprocessorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreprocessorChain")
            .field("len", &self.preprocessors.len())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct PreprocessorChain {
    preprocessors: Vec<Arc<dyn Preprocessor>>,
}

impl PreprocessorChain {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_preprocessor<P: Preprocessor + 'static>(self, preprocessor: P) -> Self {
        let mut preprocessors = self.preprocessors;
        preprocessors.push(Arc::new(preprocessor));
        Self { preprocessors }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.preprocessors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preprocessors.is_empty()
    }
}

impl Preprocessor for PreprocessorChain {
    fn preprocess(&self, cnf: &Cnf) -> Cnf {
        self.preprocessors
            .iter()
            .fold(cnf.clone(), |cnf, preprocessor| preprocessor.preprocess(&cnf))
    }
}

/// Removes repeated literals inside each clause. Clauses without repeats are
/// shared with the input.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct DuplicateLiteralElimination;

impl Preprocessor for DuplicateLiteralElimination {
    fn preprocess(&self, cnf: &Cnf) -> Cnf {
        Cnf::from_shared(
            cnf.clauses
                .iter()
                .map(|clause| {
                    if clause.has_duplicates() {
                        Rc::new(clause.dedup())
                    } else {
                        Rc::clone(clause)
                    }
                })
                .collect(),
        )
    }
}

/// Drops clauses containing a literal and its complement; they are true under
/// every assignment.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct TautologyElimination;

impl Preprocessor for TautologyElimination {
    fn preprocess(&self, cnf: &Cnf) -> Cnf {
        let kept: Vec<Rc<Clause>> = cnf
            .clauses
            .iter()
            .filter(|clause| !clause.is_tautology())
            .cloned()
            .collect();

        let dropped = cnf.len() - kept.len();
        if dropped > 0 {
            log::debug!(target: PREPROCESSING, "Dropped {dropped} tautological clauses");
        }

        Cnf::from_shared(kept)
    }
}

/// The redundancy removal used by the solver. Duplicate literals are always
/// removed; tautological clauses only when `eliminate_tautologies` is set.
#[must_use]
pub fn redundancy_chain(eliminate_tautologies: bool) -> PreprocessorChain {
    let chain = PreprocessorChain::new().add_preprocessor(DuplicateLiteralElimination);
    if eliminate_tautologies {
        chain.add_preprocessor(TautologyElimination)
    } else {
        chain
    }
}

/// Deduplicates literals per clause and drops tautologies.
#[must_use]
pub fn remove_redundancy(cnf: &Cnf) -> Cnf {
    redundancy_chain(true).preprocess(cnf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::Literal;

    fn sample() -> Cnf {
        Cnf::from(vec![
            vec![("a", true), ("a", true), ("b", false)],
            vec![("c", true), ("c", false)],
            vec![("d", false)],
            vec![("b", false), ("d", false), ("b", false)],
        ])
    }

    #[test]
    fn test_duplicate_elimination() {
        let cnf = DuplicateLiteralElimination.preprocess(&sample());
        assert_eq!(cnf.len(), 4);
        assert_eq!(
            cnf.clauses[0].literals.as_slice(),
            &[Literal::new("a", true), Literal::new("b", false)]
        );
        assert_eq!(cnf.clauses[3].len(), 2);
    }

    #[test]
    fn test_untouched_clauses_are_shared() {
        let input = sample();
        let output = DuplicateLiteralElimination.preprocess(&input);
        assert!(Rc::ptr_eq(&input.clauses[2], &output.clauses[2]));
        assert!(!Rc::ptr_eq(&input.clauses[0], &output.clauses[0]));
    }

    #[test]
    fn test_tautology_elimination() {
        let cnf = TautologyElimination.preprocess(&sample());
        assert_eq!(cnf.len(), 3);
        assert!(cnf.iter().all(|c| !c.is_tautology()));
    }

    #[test]
    fn test_remove_redundancy() {
        let cnf = remove_redundancy(&sample());
        assert_eq!(cnf.len(), 3);
        assert!(cnf.iter().all(|c| !c.has_duplicates()));
    }

    #[test]
    fn test_keep_tautologies() {
        let cnf = redundancy_chain(false).preprocess(&sample());
        assert_eq!(cnf.len(), 4);
        assert!(cnf.clauses[1].is_tautology());
    }

    #[test]
    fn test_remove_redundancy_idempotent_on_random_formulas() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..200 {
            let cnf: Cnf = (0..rng.usize(0..8))
                .map(|_| {
                    (0..rng.usize(0..6))
                        .map(|_| Literal::new(rng.u8(0..4).to_string(), rng.bool()))
                        .collect::<Clause>()
                })
                .collect();
            let once = remove_redundancy(&cnf);
            let twice = remove_redundancy(&once);
            assert_eq!(once, twice);
        }
    }
}
