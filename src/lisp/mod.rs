#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A small Lisp with lexically scoped closures.
//!
//! Source text goes through `tokenizer`, `parser` (S-expressions) and `expr`
//! (special forms resolved) before `evaluator` runs it against a chain of
//! `environment` frames rooted at the `builtins`.

pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod parser;
pub mod repl;
pub mod tokenizer;
pub mod value;

pub use error::{ErrorKind, LispError};
pub use evaluator::Interpreter;
pub use value::Value;
