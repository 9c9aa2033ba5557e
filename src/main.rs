//! # satlisp
//!
//! Command line front end for the `sat_lisp` crate.
//!
//! ## Usage
//!
//! ```sh
//! satlisp [OPTIONS] [PATH] [SUBCOMMAND]
//! ```
//!
//! A bare `PATH` is solved as a DIMACS `.cnf` file.
//!
//! 1.  **`file`**: solve a DIMACS file.
//!     ```sh
//!     satlisp file --path problem.cnf
//!     ```
//! 2.  **`text`**: solve a formula given inline, one clause per line.
//!     ```sh
//!     satlisp text --input "a -b\nb c"
//!     satlisp text --dimacs --input "1 -2 0\n2 3 0"
//!     ```
//! 3.  **`dir`**: solve every `.cnf` and `.sudoku` file under a directory.
//! 4.  **`sudoku`**: solve a Sudoku puzzle, optionally writing its DIMACS
//!     encoding next to it with `--export-dimacs`.
//! 5.  **`lisp`**: start the Lisp REPL on standard input. Type `QUIT` to leave.
//! 6.  **`completions`**: print a shell completion script.
//!
//! ## Common options
//!
//! -   `-d, --debug`: raise the log level to `debug` (`RUST_LOG` still wins).
//! -   `-v, --verify <BOOL>`: check the model against the formula (default `true`).
//! -   `-s, --stats <BOOL>`: print problem and search statistics (default `true`).
//! -   `-p, --print-solution`: print the satisfying assignment.
//! -   `--keep-tautologies`: leave tautological clauses in place during
//!     redundancy removal.

mod command_line;

use clap::Parser;
use command_line::cli::{Cli, run};
use env_logger::Env;

/// Global allocator using `tikv-jemallocator`, which also backs the memory
/// figures in the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug_requested() { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
