//! Evaluation of lowered expressions.

use crate::lisp::builtins::builtin_frame;
use crate::lisp::environment::Frame;
use crate::lisp::error::{LispError, Result};
use crate::lisp::expr::Expr;
use crate::lisp::parser::parse;
use crate::lisp::tokenizer::tokenize;
use crate::lisp::value::{Closure, Value};
use crate::logging::targets::LISP;
use std::cell::Cell;
use std::rc::Rc;

/// Deepest nesting of `evaluate` calls allowed on one thread.
pub const MAX_DEPTH: usize = 20_000;

/// Native stack that holds `MAX_DEPTH` nested evaluations.
pub const STACK_SIZE: usize = 256 * 1024 * 1024;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Holds one level of the per-thread evaluation depth until dropped. The
/// count also covers calls that builtins such as `map` make through `apply`.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<Self> {
        DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > MAX_DEPTH {
                return Err(LispError::evaluation("maximum recursion depth exceeded"));
            }
            depth.set(next);
            Ok(Self)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Evaluates `expr` in `frame`.
///
/// # Errors
///
/// `Name` for unbound symbols, `Evaluation` for calls that go wrong or
/// nest deeper than `MAX_DEPTH`.
pub fn evaluate(expr: &Expr, frame: &Rc<Frame>) -> Result<Value> {
    let _depth = DepthGuard::enter()?;
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Symbol(name) => frame.lookup(name),
        Expr::Define { name, value } => {
            let value = evaluate(value, frame)?;
            log::trace!(target: LISP, "define {name} = {value}");
            frame.bind(Rc::clone(name), value.clone());
            Ok(value)
        }
        Expr::Lambda(lambda) => Ok(Value::Closure(Rc::new(Closure::new(
            Rc::clone(lambda),
            Rc::clone(frame),
        )))),
        Expr::If {
            condition,
            then,
            otherwise,
        } => {
            if evaluate(condition, frame)?.is_truthy() {
                evaluate(then, frame)
            } else {
                evaluate(otherwise, frame)
            }
        }
        Expr::And(operands) => {
            let mut result = Value::Bool(true);
            for operand in operands {
                result = evaluate(operand, frame)?;
                if !result.is_truthy() {
                    break;
                }
            }
            Ok(result)
        }
        Expr::Or(operands) => {
            let mut result = Value::Bool(false);
            for operand in operands {
                result = evaluate(operand, frame)?;
                if result.is_truthy() {
                    break;
                }
            }
            Ok(result)
        }
        Expr::Application { callee, args } => {
            let func = evaluate(callee, frame)?;
            if !func.is_callable() {
                return Err(LispError::evaluation(format!("{func} is not callable")));
            }
            let args = args
                .iter()
                .map(|arg| evaluate(arg, frame))
                .collect::<Result<Vec<_>>>()?;
            apply(&func, &args)
        }
    }
}

/// Calls a builtin or closure with already evaluated arguments.
///
/// A closure body runs in a fresh frame whose parent is the frame the closure
/// was created in, not the caller's.
///
/// # Errors
///
/// `Evaluation` when `func` is not callable or the argument count does not
/// match a closure's parameters; otherwise whatever the call raises.
pub fn apply(func: &Value, args: &[Value]) -> Result<Value> {
    match func {
        Value::Builtin(builtin) => (builtin.func)(args),
        Value::Closure(closure) => {
            if args.len() != closure.arity() {
                return Err(LispError::evaluation(format!(
                    "{func} expects {} argument(s), got {}",
                    closure.arity(),
                    args.len()
                )));
            }
            let call_frame = Frame::child(&closure.env);
            for (param, arg) in closure.lambda.params.iter().zip(args) {
                call_frame.bind(Rc::clone(param), arg.clone());
            }
            evaluate(&closure.lambda.body, &call_frame)
        }
        other => Err(LispError::evaluation(format!("{other} is not callable"))),
    }
}

/// Tokenizes, parses, lowers and evaluates one expression.
///
/// # Errors
///
/// Any error kind.
pub fn evaluate_source(source: &str, frame: &Rc<Frame>) -> Result<Value> {
    let sexpr = parse(&tokenize(source))?;
    evaluate(&Expr::lower(&sexpr)?, frame)
}

/// An evaluation session. Definitions persist across calls to `eval` in a
/// global frame whose parent holds the builtins.
#[derive(Debug, Clone)]
pub struct Interpreter {
    global: Rc<Frame>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: Frame::child(&builtin_frame()),
        }
    }

    #[must_use]
    pub const fn global(&self) -> &Rc<Frame> {
        &self.global
    }

    /// Evaluates one expression of source text in the global frame.
    ///
    /// # Errors
    ///
    /// Any error kind. A failed evaluation leaves earlier definitions intact.
    pub fn eval(&self, source: &str) -> Result<Value> {
        evaluate_source(source, &self.global)
    }
}
