#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod assignment;
pub mod clause;
pub mod cnf;
pub mod dimacs;
pub mod dpll;
pub mod literal;
pub mod preprocessing;
pub mod propagation;
pub mod solver;

pub use assignment::Assignment;
pub use cnf::Cnf;
pub use dpll::{Dpll, solve};
pub use literal::Literal;
