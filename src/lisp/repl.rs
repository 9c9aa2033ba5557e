//! Line oriented read-eval-print loop.

use crate::lisp::error::Result;
use crate::lisp::evaluator::{Interpreter, evaluate};
use crate::lisp::expr::Expr;
use crate::lisp::parser::parse;
use crate::lisp::tokenizer::tokenize;
use crate::lisp::value::Value;
use crate::logging::targets::LISP;
use std::io::{self, BufRead, Write};

/// Input line that ends the session.
pub const QUIT: &str = "QUIT";
pub const PROMPT: &str = "in> ";
pub const OUTPUT_PREFIX: &str = "  out> ";
pub const ERROR_PREFIX: &str = "Error> ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplOptions {
    /// Echo the tokens and the parsed expression before evaluating.
    pub verbose: bool,
}

/// Reads one expression per line from `input` and writes results to
/// `output` until `QUIT` or end of input. Lines holding no tokens (blank or
/// comment only) are skipped. Lisp errors are reported on `output` and the
/// loop continues with every definition made so far.
///
/// # Errors
///
/// Only I/O errors on `input` or `output`.
pub fn run<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    options: ReplOptions,
) -> io::Result<Interpreter> {
    let interpreter = Interpreter::new();
    let mut lines = input.lines();

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(output)?;
            break;
        };
        let line = line.trim_end_matches(['\r', '\n']);
        if line == QUIT {
            break;
        }
        if tokenize(line).is_empty() {
            continue;
        }

        match eval_line(&interpreter, line, output, options)? {
            Ok(value) => writeln!(output, "{OUTPUT_PREFIX}{value}")?,
            Err(err) => {
                log::debug!(target: LISP, "{err}");
                writeln!(output, "{ERROR_PREFIX}{err}")?;
            }
        }
    }

    Ok(interpreter)
}

fn eval_line<W: Write>(
    interpreter: &Interpreter,
    line: &str,
    output: &mut W,
    options: ReplOptions,
) -> io::Result<Result<Value>> {
    let tokens = tokenize(line);
    if options.verbose {
        writeln!(output, "tokens> {tokens:?}")?;
    }

    let sexpr = match parse(&tokens) {
        Ok(sexpr) => sexpr,
        Err(err) => return Ok(Err(err)),
    };
    if options.verbose {
        writeln!(output, "expression> {sexpr}")?;
    }

    Ok(Expr::lower(&sexpr).and_then(|expr| evaluate(&expr, interpreter.global())))
}
