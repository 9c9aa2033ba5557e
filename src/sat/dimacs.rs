#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Reading and writing the DIMACS CNF format.
//!
//! The format is line oriented:
//! - Comment lines start with `c`.
//! - The problem line is `p cnf <num_variables> <num_clauses>`. Counts that
//!   disagree with the body are logged, not rejected.
//! - Clauses are whitespace separated non-zero integers terminated by `0`. A
//!   clause may span lines; a bare `0` is the empty clause.
//! - A `%` line ends the data.
//!
//! DIMACS variables are integers, so parsed variables are named by their
//! decimal form. Writing goes the other way: named variables are numbered in
//! order of first appearance and the mapping is emitted as comments.

use crate::logging::targets::DIMACS;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use rustc_hash::FxHashMap;
use std::fmt::Write as _;
use std::io::{self, BufRead};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum DimacsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: failed to parse literal '{token}'")]
    Literal { line: usize, token: String },

    #[error("line {line}: malformed problem line '{text}'")]
    Problem { line: usize, text: String },
}

/// Parses DIMACS data from any buffered reader.
///
/// # Errors
///
/// Fails on I/O errors, non-integer literals, or a malformed `p` line.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf, DimacsError> {
    let mut cnf = Cnf::default();
    let mut header: Option<(usize, usize)> = None;
    let mut pending: Vec<Literal> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let mut parts = line.split_whitespace().peekable();

        match parts.peek() {
            Some(&"%") => break,
            None => {}
            Some(token) if token.starts_with('c') => {}
            Some(&"p") => header = Some(parse_problem_line(&line, line_no)?),
            Some(_) => {
                for token in parts {
                    let value: i32 = token.parse().map_err(|_| DimacsError::Literal {
                        line: line_no,
                        token: token.to_string(),
                    })?;
                    if value == 0 {
                        cnf.add_clause(Clause::new(pending.drain(..)));
                    } else {
                        pending.push(Literal::from_i32(value));
                    }
                }
            }
        }
    }

    if !pending.is_empty() {
        log::warn!(target: DIMACS, "Last clause is missing its terminating 0");
        cnf.add_clause(Clause::new(pending));
    }

    if let Some((vars, clauses)) = header {
        if clauses != cnf.len() {
            log::warn!(
                target: DIMACS,
                "Header declares {clauses} clauses but {} were read",
                cnf.len()
            );
        }
        if cnf.num_vars() > vars {
            log::warn!(
                target: DIMACS,
                "Header declares {vars} variables but {} occur",
                cnf.num_vars()
            );
        }
    }

    Ok(cnf)
}

fn parse_problem_line(line: &str, line_no: usize) -> Result<(usize, usize), DimacsError> {
    let malformed = || DimacsError::Problem {
        line: line_no,
        text: line.to_string(),
    };

    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["p", "cnf", vars, clauses] => Ok((
            vars.parse().map_err(|_| malformed())?,
            clauses.parse().map_err(|_| malformed())?,
        )),
        _ => Err(malformed()),
    }
}

/// Parses a DIMACS file.
///
/// # Errors
///
/// See [`parse_dimacs`]; also fails if the file cannot be opened.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf, DimacsError> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}

/// Writes `cnf` as DIMACS, numbering variables by first appearance.
///
/// Each variable gets a `c <index> <name>` comment so the numbering can be
/// undone with [`variable_names`].
#[must_use]
pub fn to_dimacs(cnf: &Cnf) -> String {
    let variables = cnf.variables();
    let index: FxHashMap<&Variable, usize> = variables
        .iter()
        .enumerate()
        .map(|(i, var)| (var, i + 1))
        .collect();

    let mut out = String::new();
    for (var, i) in variables.iter().zip(1..) {
        let _ = writeln!(out, "c {i} {var}");
    }
    let _ = writeln!(out, "p cnf {} {}", variables.len(), cnf.len());

    for clause in cnf.iter() {
        for lit in clause.iter() {
            let i = index[lit.variable()];
            if lit.polarity() {
                let _ = write!(out, "{i} ");
            } else {
                let _ = write!(out, "-{i} ");
            }
        }
        out.push_str("0\n");
    }
    out
}

/// Maps the `c <index> <name>` comments written by [`to_dimacs`] back to
/// names. Used to translate models from external solvers.
#[must_use]
pub fn variable_names(dimacs: &str) -> FxHashMap<usize, String> {
    dimacs
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some("c"), Some(i), Some(name), None) => Some((i.parse().ok()?, name.to_string())),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::io::Cursor;

    fn clause_strings(cnf: &Cnf) -> Vec<String> {
        cnf.iter()
            .map(|c| c.iter().map(ToString::to_string).sorted().join(" "))
            .collect()
    }

    #[test]
    fn test_parse_simple_dimacs() {
        let dimacs_content = "c This is a comment\n\
                              p cnf 3 2\n\
                              1 -2 0\n\
                              2 3 0\n";
        let cnf = parse_dimacs(Cursor::new(dimacs_content)).unwrap();

        assert_eq!(cnf.len(), 2, "Should parse 2 clauses");
        assert_eq!(cnf.num_vars(), 3);
        assert_eq!(clause_strings(&cnf), vec!["-2 1", "2 3"]);
    }

    #[test]
    fn test_parse_dimacs_with_empty_lines_and_end_marker() {
        let dimacs_content = "p cnf 2 2\n\
                              \n\
                              1 0\n\
                              \n\
                              -2 0\n\
                              %\n\
                              c this should be ignored";
        let cnf = parse_dimacs(Cursor::new(dimacs_content)).unwrap();

        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.clauses[0][0], Literal::from(1));
        assert_eq!(cnf.clauses[1][0], Literal::from(-2));
    }

    #[test]
    fn test_parse_dimacs_clause_spanning_lines() {
        let cnf = parse_dimacs(Cursor::new("1 2\n-3 0 4 0\n")).unwrap();
        assert_eq!(clause_strings(&cnf), vec!["-3 1 2", "4"]);
    }

    #[test]
    fn test_parse_dimacs_empty_clause() {
        let cnf = parse_dimacs(Cursor::new("p cnf 1 1\n0\n")).unwrap();
        assert_eq!(cnf.len(), 1);
        assert!(cnf.has_empty_clause());
    }

    #[test]
    fn test_parse_dimacs_malformed_literal() {
        let err = parse_dimacs(Cursor::new("1 abc 0\n")).unwrap_err();
        assert!(matches!(err, DimacsError::Literal { line: 1, ref token } if token == "abc"));
    }

    #[test]
    fn test_parse_dimacs_malformed_header() {
        let err = parse_dimacs(Cursor::new("p dnf 1 1\n1 0\n")).unwrap_err();
        assert!(matches!(err, DimacsError::Problem { line: 1, .. }));
    }

    #[test]
    fn test_parse_dimacs_no_clauses() {
        let cnf = parse_dimacs(Cursor::new("p cnf 0 0\n")).unwrap();
        assert!(cnf.is_empty());
    }

    #[test]
    fn test_to_dimacs_numbers_by_first_appearance() {
        let cnf = Cnf::from(vec![
            vec![("x", true), ("y", false)],
            vec![("y", true), ("z", true)],
        ]);
        let text = to_dimacs(&cnf);
        assert_eq!(
            text,
            "c 1 x\nc 2 y\nc 3 z\np cnf 3 2\n1 -2 0\n2 3 0\n"
        );

        let names = variable_names(&text);
        assert_eq!(names[&2], "y");

        let reparsed = parse_dimacs(Cursor::new(text)).unwrap();
        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed.num_vars(), 3);
    }
}
