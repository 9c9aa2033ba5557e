//! A backtracking DPLL SAT solver over named literals, a Sudoku front end that
//! encodes puzzles as CNF, and a small lexically scoped Lisp interpreter.

/// CNF formulas, simplification and the DPLL search.
pub mod sat;

/// Sudoku boards of any perfect square size, solved through `sat`.
pub mod sudoku;

/// Tokenizer, parser, evaluator and REPL for the Lisp dialect.
pub mod lisp;

/// Log targets shared by the modules above.
pub mod logging;
