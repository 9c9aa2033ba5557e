//! Builds S-expressions from tokens.

use crate::lisp::error::{LispError, Result};
use crate::lisp::value::Number;
use itertools::Itertools;
use std::fmt::{self, Display};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Sexpr {
    Int(i64),
    Float(f64),
    Symbol(Rc<str>),
    List(Vec<Sexpr>),
}

impl Sexpr {
    #[must_use]
    pub const fn as_number(&self) -> Option<Number> {
        match *self {
            Self::Int(n) => Some(Number::Int(n)),
            Self::Float(x) => Some(Number::Float(x)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_symbol(&self) -> Option<&Rc<str>> {
        match self {
            Self::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

impl Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Symbol(name) => write!(f, "{name}"),
            Self::List(items) => write!(f, "({})", items.iter().join(" ")),
        }
    }
}

/// An integer if the token reads as one, else a float, else a symbol.
///
/// Only tokens holding a digit are tried as floats, so `inf` and `nan` stay
/// symbols.
#[must_use]
pub fn number_or_symbol(token: &str) -> Sexpr {
    if let Ok(n) = token.parse::<i64>() {
        return Sexpr::Int(n);
    }
    if token.contains(|c: char| c.is_ascii_digit()) {
        if let Ok(x) = token.parse::<f64>() {
            return Sexpr::Float(x);
        }
    }
    Sexpr::Symbol(Rc::from(token))
}

/// Deepest parenthesis nesting `parse` accepts. Lowering, display and drop
/// of the tree all recurse once per level.
pub const MAX_NESTING: usize = 1_000;

/// Parses exactly one expression from `tokens`.
///
/// # Errors
///
/// `Syntax` when the tokens are empty, the parentheses are unbalanced,
/// lists nest deeper than `MAX_NESTING`, or more than one top-level
/// expression is present.
pub fn parse(tokens: &[&str]) -> Result<Sexpr> {
    // The last entry is the list being filled; the bottom one collects
    // top-level expressions.
    let mut open: Vec<Vec<Sexpr>> = vec![Vec::new()];

    for &token in tokens {
        match token {
            "(" => {
                if open.len() > MAX_NESTING {
                    return Err(LispError::syntax(format!(
                        "lists nested deeper than {MAX_NESTING}"
                    )));
                }
                open.push(Vec::new());
            }
            ")" => {
                if open.len() < 2 {
                    return Err(LispError::syntax("unexpected ')'"));
                }
                let list = open.pop().unwrap_or_default();
                if let Some(parent) = open.last_mut() {
                    parent.push(Sexpr::List(list));
                }
            }
            atom => {
                if let Some(current) = open.last_mut() {
                    current.push(number_or_symbol(atom));
                }
            }
        }

        if open.first().is_some_and(|top| top.len() > 1) {
            return Err(LispError::syntax("more than one expression"));
        }
    }

    if open.len() != 1 {
        return Err(LispError::syntax("missing ')'"));
    }

    open.pop()
        .and_then(|mut top| top.pop())
        .ok_or_else(|| LispError::syntax("empty input"))
}
