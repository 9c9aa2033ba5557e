#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Sudoku boards and their CNF encoding.

pub mod solver;

pub use solver::{Board, Sudoku, SudokuError, parse_sudoku_file};
