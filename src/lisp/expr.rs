//! Expressions lowered from S-expressions.
//!
//! Special forms are recognised once, when a parse tree is lowered, so the
//! evaluator dispatches on a tag instead of comparing symbol names.

use crate::lisp::error::{LispError, Result};
use crate::lisp::parser::Sexpr;
use crate::lisp::value::Number;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<Rc<str>>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Number),
    Symbol(Rc<str>),
    Define {
        name: Rc<str>,
        value: Box<Expr>,
    },
    Lambda(Rc<Lambda>),
    If {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Application {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Lowers a parse tree.
    ///
    /// # Errors
    ///
    /// `Syntax` for an empty list in call position, `Evaluation` for a
    /// malformed special form.
    pub fn lower(sexpr: &Sexpr) -> Result<Self> {
        match sexpr {
            Sexpr::Int(_) | Sexpr::Float(_) => sexpr
                .as_number()
                .map(Self::Number)
                .ok_or_else(|| LispError::syntax("expected a number")),
            Sexpr::Symbol(name) => Ok(Self::Symbol(Rc::clone(name))),
            Sexpr::List(items) => {
                let Some((head, rest)) = items.split_first() else {
                    return Err(LispError::syntax("cannot evaluate an empty list"));
                };
                match head.as_symbol().map(|name| &**name) {
                    Some("define") => lower_define(rest),
                    Some("lambda") => lower_lambda(rest),
                    Some("if") => lower_if(rest),
                    Some("and") => Ok(Self::And(lower_all(rest)?)),
                    Some("or") => Ok(Self::Or(lower_all(rest)?)),
                    _ => Ok(Self::Application {
                        callee: Box::new(Self::lower(head)?),
                        args: lower_all(rest)?,
                    }),
                }
            }
        }
    }
}

fn lower_all(items: &[Sexpr]) -> Result<Vec<Expr>> {
    items.iter().map(Expr::lower).collect()
}

fn params(sexprs: &[Sexpr], form: &str) -> Result<Vec<Rc<str>>> {
    sexprs
        .iter()
        .map(|p| {
            p.as_symbol()
                .cloned()
                .ok_or_else(|| LispError::evaluation(format!("{form}: parameter {p} is not a symbol")))
        })
        .collect()
}

/// `(define NAME EXPR)` or `(define (NAME PARAM...) EXPR)`.
fn lower_define(rest: &[Sexpr]) -> Result<Expr> {
    let [target, value] = rest else {
        return Err(LispError::evaluation(format!(
            "define expects 2 parts, got {}",
            rest.len()
        )));
    };

    match target {
        Sexpr::Symbol(name) => Ok(Expr::Define {
            name: Rc::clone(name),
            value: Box::new(Expr::lower(value)?),
        }),
        Sexpr::List(signature) => {
            let Some((Sexpr::Symbol(name), param_sexprs)) = signature.split_first() else {
                return Err(LispError::evaluation("define: function name must be a symbol"));
            };
            let lambda = Lambda {
                params: params(param_sexprs, "define")?,
                body: Expr::lower(value)?,
            };
            Ok(Expr::Define {
                name: Rc::clone(name),
                value: Box::new(Expr::Lambda(Rc::new(lambda))),
            })
        }
        _ => Err(LispError::evaluation(format!("define: cannot bind {target}"))),
    }
}

/// `(lambda (PARAM...) BODY)`.
fn lower_lambda(rest: &[Sexpr]) -> Result<Expr> {
    let [Sexpr::List(param_sexprs), body] = rest else {
        return Err(LispError::evaluation(
            "lambda expects a parameter list and a body",
        ));
    };
    Ok(Expr::Lambda(Rc::new(Lambda {
        params: params(param_sexprs, "lambda")?,
        body: Expr::lower(body)?,
    })))
}

/// `(if COND THEN ELSE)`.
fn lower_if(rest: &[Sexpr]) -> Result<Expr> {
    let [condition, then, otherwise] = rest else {
        return Err(LispError::evaluation(format!(
            "if expects 3 parts, got {}",
            rest.len()
        )));
    };
    Ok(Expr::If {
        condition: Box::new(Expr::lower(condition)?),
        then: Box::new(Expr::lower(then)?),
        otherwise: Box::new(Expr::lower(otherwise)?),
    })
}
