//! Argument parsing and the per-subcommand drivers of the binary.

pub(crate) mod cli;
