//! Runtime values.

use crate::lisp::environment::Frame;
use crate::lisp::error::{LispError, Result};
use crate::lisp::expr::Lambda;
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::mem;
use std::rc::Rc;

/// Integers stay integral until an operation meets a float.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Int(n) => n as f64,
            Self::Float(x) => x,
        }
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        match self {
            Self::Int(n) => n == 0,
            Self::Float(x) => x == 0.0,
        }
    }

    fn combine(
        self,
        other: Self,
        op: &str,
        int: fn(i64, i64) -> Option<i64>,
        float: fn(f64, f64) -> f64,
    ) -> Result<Self> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => int(a, b)
                .map(Self::Int)
                .ok_or_else(|| LispError::evaluation(format!("integer overflow in {a} {op} {b}"))),
            _ => Ok(Self::Float(float(self.as_f64(), other.as_f64()))),
        }
    }

    /// # Errors
    ///
    /// Integer overflow.
    pub fn add(self, other: Self) -> Result<Self> {
        self.combine(other, "+", i64::checked_add, |a, b| a + b)
    }

    /// # Errors
    ///
    /// Integer overflow.
    pub fn sub(self, other: Self) -> Result<Self> {
        self.combine(other, "-", i64::checked_sub, |a, b| a - b)
    }

    /// # Errors
    ///
    /// Integer overflow.
    pub fn mul(self, other: Self) -> Result<Self> {
        self.combine(other, "*", i64::checked_mul, |a, b| a * b)
    }

    /// Always produces a float.
    ///
    /// # Errors
    ///
    /// Division by zero.
    pub fn div(self, other: Self) -> Result<Self> {
        if other.is_zero() {
            return Err(LispError::evaluation("division by zero"));
        }
        Ok(Self::Float(self.as_f64() / other.as_f64()))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

pub type BuiltinFn = fn(&[Value]) -> Result<Value>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// A lambda together with the frame it was evaluated in.
pub struct Closure {
    pub lambda: Rc<Lambda>,
    pub env: Rc<Frame>,
}

impl Closure {
    #[must_use]
    pub const fn new(lambda: Rc<Lambda>, env: Rc<Frame>) -> Self {
        Self { lambda, env }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.lambda.params.len()
    }
}

// The captured frame can hold this closure, so it is left out.
impl Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.lambda.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Pair {
    pub car: Value,
    pub cdr: Value,
}

impl Pair {
    /// Moves any uniquely owned child pairs onto `pending`, leaving `nil`.
    fn unlink_into(&mut self, pending: &mut Vec<Rc<Self>>) {
        for field in [&mut self.car, &mut self.cdr] {
            if matches!(field, Value::Pair(_)) {
                if let Value::Pair(child) = mem::replace(field, Value::Nil) {
                    pending.push(child);
                }
            }
        }
    }
}

// Lists can be far longer than the native stack is deep, so child pairs are
// released from a worklist instead of by recursive drop glue.
impl Drop for Pair {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.unlink_into(&mut pending);
        while let Some(child) = pending.pop() {
            if let Ok(mut pair) = Rc::try_unwrap(child) {
                pair.unlink_into(&mut pending);
            }
        }
    }
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        structurally_equal(vec![(&self.car, &other.car), (&self.cdr, &other.cdr)])
    }
}

/// Compares every queued pair of values, descending into pairs through the
/// worklist rather than the call stack.
fn structurally_equal<'a>(mut pending: Vec<(&'a Value, &'a Value)>) -> bool {
    while let Some((a, b)) = pending.pop() {
        match (a, b) {
            (Value::Pair(x), Value::Pair(y)) => {
                pending.push((&x.cdr, &y.cdr));
                pending.push((&x.car, &y.car));
            }
            _ if !atom_equal(a, b) => return false,
            _ => {}
        }
    }
    true
}

fn atom_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Nil, Value::Nil) => true,
        (Value::Builtin(x), Value::Builtin(y)) => x.name == y.name,
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Number(Number),
    Bool(bool),
    Nil,
    Pair(Rc<Pair>),
    Builtin(Builtin),
    Closure(Rc<Closure>),
}

impl Value {
    #[must_use]
    pub const fn int(n: i64) -> Self {
        Self::Number(Number::Int(n))
    }

    #[must_use]
    pub const fn float(x: f64) -> Self {
        Self::Number(Number::Float(x))
    }

    #[must_use]
    pub fn cons(car: Self, cdr: Self) -> Self {
        Self::Pair(Rc::new(Pair { car, cdr }))
    }

    /// Builds a proper list ending in `nil`.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Self::Nil, |tail, head| Self::cons(head, tail))
    }

    /// `#f` and numeric zero are false; every other value is true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => !n.is_zero(),
            _ => true,
        }
    }

    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Builtin(_) | Self::Closure(_))
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Walks a chain of pairs. `None` unless it ends in `nil`.
    #[must_use]
    pub fn list_items(&self) -> Option<Vec<Self>> {
        let mut items = Vec::new();
        let mut current = self;
        loop {
            match current {
                Self::Nil => return Some(items),
                Self::Pair(pair) => {
                    items.push(pair.car.clone());
                    current = &pair.cdr;
                }
                _ => return None,
            }
        }
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        let mut current = self;
        loop {
            match current {
                Self::Nil => return true,
                Self::Pair(pair) => current = &pair.cdr,
                _ => return false,
            }
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Number(Number::Int(_)) => "integer",
            Self::Number(Number::Float(_)) => "float",
            Self::Bool(_) => "boolean",
            Self::Nil => "nil",
            Self::Pair(_) => "pair",
            Self::Builtin(_) => "builtin",
            Self::Closure(_) => "function",
        }
    }
}

/// Numbers compare by value across int and float, pairs structurally,
/// builtins by name and closures by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        structurally_equal(vec![(self, other)])
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(true) => write!(f, "#t"),
            Self::Bool(false) => write!(f, "#f"),
            Self::Nil => write!(f, "nil"),
            Self::Pair(pair) => {
                let mut items = vec![&pair.car];
                let mut tail = &pair.cdr;
                while let Self::Pair(next) = tail {
                    items.push(&next.car);
                    tail = &next.cdr;
                }
                write!(f, "({}", items.iter().join(" "))?;
                if !matches!(tail, Self::Nil) {
                    write!(f, " . {tail}")?;
                }
                write!(f, ")")
            }
            Self::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name),
            Self::Closure(closure) => {
                write!(f, "<function ({})>", closure.lambda.params.iter().join(" "))
            }
        }
    }
}
