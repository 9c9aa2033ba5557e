//! Log targets used throughout the crate.
//!
//! Filter on these with `RUST_LOG`, e.g. `RUST_LOG=dpll=trace`.

pub mod targets {
    pub const DPLL: &str = "dpll";
    pub const PROPAGATION: &str = "propagation";
    pub const PREPROCESSING: &str = "preprocessing";
    pub const DIMACS: &str = "dimacs";
    pub const SUDOKU: &str = "sudoku";
    pub const LISP: &str = "lisp";
}
