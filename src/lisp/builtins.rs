//! Functions and constants bound in the builtin frame.

use crate::lisp::environment::Frame;
use crate::lisp::error::{LispError, Result};
use crate::lisp::evaluator::apply;
use crate::lisp::value::{Builtin, BuiltinFn, Number, Value};
use itertools::Itertools;
use std::cmp::Ordering;
use std::rc::Rc;

pub const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("+", add),
    ("-", sub),
    ("*", mul),
    ("/", div),
    ("cons", cons),
    ("car", car),
    ("cdr", cdr),
    ("list", list),
    ("list?", is_list),
    ("length", length),
    ("list-ref", list_ref),
    ("append", append),
    ("map", map),
    ("filter", filter),
    ("reduce", reduce),
    ("equal?", equal),
    (">", greater),
    (">=", greater_equal),
    ("<", less),
    ("<=", less_equal),
    ("not", not),
];

/// A parentless frame holding every builtin plus `#t`, `#f` and `nil`.
#[must_use]
pub fn builtin_frame() -> Rc<Frame> {
    let frame = Frame::root();
    for &(name, func) in BUILTINS {
        frame.bind(Rc::from(name), Value::Builtin(Builtin { name, func }));
    }
    frame.bind(Rc::from("#t"), Value::Bool(true));
    frame.bind(Rc::from("#f"), Value::Bool(false));
    frame.bind(Rc::from("nil"), Value::Nil);
    frame
}

fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(LispError::evaluation(format!(
            "{name} expects {expected} argument(s), got {}",
            args.len()
        )))
    }
}

fn number(name: &str, value: &Value) -> Result<Number> {
    value.as_number().ok_or_else(|| {
        LispError::evaluation(format!("{name}: expected a number, got {}", value.type_name()))
    })
}

fn numbers(name: &str, args: &[Value]) -> Result<Vec<Number>> {
    args.iter().map(|arg| number(name, arg)).collect()
}

fn proper_list(name: &str, value: &Value) -> Result<Vec<Value>> {
    value
        .list_items()
        .ok_or_else(|| LispError::evaluation(format!("{name}: {value} is not a list")))
}

fn product(name: &str, args: &[Value]) -> Result<Number> {
    numbers(name, args)?
        .into_iter()
        .try_fold(Number::Int(1), Number::mul)
}

fn add(args: &[Value]) -> Result<Value> {
    numbers("+", args)?
        .into_iter()
        .try_fold(Number::Int(0), Number::add)
        .map(Value::Number)
}

fn sub(args: &[Value]) -> Result<Value> {
    match numbers("-", args)?.as_slice() {
        [] => Err(LispError::evaluation("- expects at least 1 argument")),
        [only] => Number::Int(0).sub(*only).map(Value::Number),
        [first, rest @ ..] => rest
            .iter()
            .try_fold(*first, |acc, &n| acc.sub(n))
            .map(Value::Number),
    }
}

fn mul(args: &[Value]) -> Result<Value> {
    product("*", args).map(Value::Number)
}

fn div(args: &[Value]) -> Result<Value> {
    match args {
        [] => Err(LispError::evaluation("/ expects at least 1 argument")),
        [only] => Number::Int(1).div(number("/", only)?).map(Value::Number),
        [first, rest @ ..] => number("/", first)?
            .div(product("/", rest)?)
            .map(Value::Number),
    }
}

fn cons(args: &[Value]) -> Result<Value> {
    expect_arity("cons", args, 2)?;
    Ok(Value::cons(args[0].clone(), args[1].clone()))
}

fn car(args: &[Value]) -> Result<Value> {
    expect_arity("car", args, 1)?;
    match &args[0] {
        Value::Pair(pair) => Ok(pair.car.clone()),
        other => Err(LispError::evaluation(format!("car: {other} is not a pair"))),
    }
}

fn cdr(args: &[Value]) -> Result<Value> {
    expect_arity("cdr", args, 1)?;
    match &args[0] {
        Value::Pair(pair) => Ok(pair.cdr.clone()),
        other => Err(LispError::evaluation(format!("cdr: {other} is not a pair"))),
    }
}

fn list(args: &[Value]) -> Result<Value> {
    Ok(Value::list(args.iter().cloned()))
}

fn is_list(args: &[Value]) -> Result<Value> {
    expect_arity("list?", args, 1)?;
    Ok(Value::Bool(args[0].is_list()))
}

fn length(args: &[Value]) -> Result<Value> {
    expect_arity("length", args, 1)?;
    let items = proper_list("length", &args[0])?;
    i64::try_from(items.len())
        .map(Value::int)
        .map_err(|_| LispError::evaluation("length: list too long"))
}

/// `(list-ref LIST INDEX)`. A pair that is not a proper list only answers
/// index 0.
fn list_ref(args: &[Value]) -> Result<Value> {
    expect_arity("list-ref", args, 2)?;
    let index = match number("list-ref", &args[1])? {
        Number::Int(i) if i >= 0 => usize::try_from(i).unwrap_or(usize::MAX),
        other => {
            return Err(LispError::evaluation(format!(
                "list-ref: invalid index {other}"
            )));
        }
    };

    match (&args[0], args[0].list_items()) {
        (_, Some(items)) => items
            .into_iter()
            .nth(index)
            .ok_or_else(|| LispError::evaluation(format!("list-ref: index {index} out of range"))),
        (Value::Pair(pair), None) if index == 0 => Ok(pair.car.clone()),
        (Value::Pair(_), None) => Err(LispError::evaluation(
            "list-ref: only index 0 of a non-list pair exists",
        )),
        (other, None) => Err(LispError::evaluation(format!(
            "list-ref: {other} is not a list"
        ))),
    }
}

fn append(args: &[Value]) -> Result<Value> {
    let mut items = Vec::new();
    for arg in args {
        items.extend(proper_list("append", arg)?);
    }
    Ok(Value::list(items))
}

/// `(map FUNCTION LIST)`.
fn map(args: &[Value]) -> Result<Value> {
    expect_arity("map", args, 2)?;
    let func = &args[0];
    let mapped = proper_list("map", &args[1])?
        .into_iter()
        .map(|item| apply(func, &[item]))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::list(mapped))
}

/// `(filter FUNCTION LIST)`. Keeps the items the function maps to a truthy
/// value.
fn filter(args: &[Value]) -> Result<Value> {
    expect_arity("filter", args, 2)?;
    let func = &args[0];
    let mut kept = Vec::new();
    for item in proper_list("filter", &args[1])? {
        if apply(func, std::slice::from_ref(&item))?.is_truthy() {
            kept.push(item);
        }
    }
    Ok(Value::list(kept))
}

/// `(reduce FUNCTION LIST INITIAL)`, folding from the left.
fn reduce(args: &[Value]) -> Result<Value> {
    expect_arity("reduce", args, 3)?;
    let func = &args[0];
    proper_list("reduce", &args[1])?
        .into_iter()
        .try_fold(args[2].clone(), |acc, item| apply(func, &[acc, item]))
}

fn equal(args: &[Value]) -> Result<Value> {
    Ok(Value::Bool(args.iter().tuple_windows().all(|(a, b)| a == b)))
}

/// Checks `test` on every adjacent pair of numeric arguments.
fn chain(name: &str, args: &[Value], test: fn(Ordering) -> bool) -> Result<Value> {
    let nums = numbers(name, args)?;
    Ok(Value::Bool(
        nums.iter()
            .tuple_windows()
            .all(|(a, b)| a.partial_cmp(b).is_some_and(test)),
    ))
}

fn greater(args: &[Value]) -> Result<Value> {
    chain(">", args, Ordering::is_gt)
}

fn greater_equal(args: &[Value]) -> Result<Value> {
    chain(">=", args, Ordering::is_ge)
}

fn less(args: &[Value]) -> Result<Value> {
    chain("<", args, Ordering::is_lt)
}

fn less_equal(args: &[Value]) -> Result<Value> {
    chain("<=", args, Ordering::is_le)
}

fn not(args: &[Value]) -> Result<Value> {
    expect_arity("not", args, 1)?;
    Ok(Value::Bool(!args[0].is_truthy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lisp::error::ErrorKind;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::int).collect()
    }

    fn builtin(name: &str) -> Value {
        builtin_frame().lookup(name).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(add(&[]), Ok(Value::int(0)));
        assert_eq!(add(&ints(&[1, 2, 3])), Ok(Value::int(6)));
        assert_eq!(sub(&ints(&[5])), Ok(Value::int(-5)));
        assert_eq!(sub(&ints(&[10, 3, 2])), Ok(Value::int(5)));
        assert_eq!(mul(&[]), Ok(Value::int(1)));
        assert_eq!(mul(&ints(&[2, 3, 4])), Ok(Value::int(24)));
        assert_eq!(div(&ints(&[2])), Ok(Value::float(0.5)));
        assert_eq!(div(&ints(&[12, 2, 3])), Ok(Value::float(2.0)));
        assert_eq!(add(&[Value::int(1), Value::float(0.5)]), Ok(Value::float(1.5)));
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(sub(&[]).unwrap_err().kind(), ErrorKind::Evaluation);
        assert_eq!(div(&ints(&[1, 0])).unwrap_err().kind(), ErrorKind::Evaluation);
        assert_eq!(add(&[Value::Nil]).unwrap_err().kind(), ErrorKind::Evaluation);
        assert_eq!(
            mul(&ints(&[i64::MAX, 2])).unwrap_err().kind(),
            ErrorKind::Evaluation
        );
    }

    #[test]
    fn test_pairs() {
        let pair = cons(&ints(&[1, 2])).unwrap();
        assert_eq!(car(&[pair.clone()]), Ok(Value::int(1)));
        assert_eq!(cdr(&[pair]), Ok(Value::int(2)));
        assert_eq!(car(&[Value::Nil]).unwrap_err().kind(), ErrorKind::Evaluation);
        assert_eq!(cons(&ints(&[1])).unwrap_err().kind(), ErrorKind::Evaluation);
    }

    #[test]
    fn test_list_operations() {
        let xs = list(&ints(&[1, 2, 3])).unwrap();
        assert_eq!(is_list(&[xs.clone()]), Ok(Value::Bool(true)));
        assert_eq!(is_list(&[Value::int(1)]), Ok(Value::Bool(false)));
        assert_eq!(length(&[xs.clone()]), Ok(Value::int(3)));
        assert_eq!(length(&[Value::Nil]), Ok(Value::int(0)));
        assert_eq!(list_ref(&[xs.clone(), Value::int(2)]), Ok(Value::int(3)));
        assert_eq!(
            list_ref(&[xs.clone(), Value::int(3)]).unwrap_err().kind(),
            ErrorKind::Evaluation
        );

        let joined = append(&[xs.clone(), Value::Nil, xs]).unwrap();
        assert_eq!(joined.to_string(), "(1 2 3 1 2 3)");
        assert_eq!(append(&[]), Ok(Value::Nil));
    }

    #[test]
    fn test_list_ref_on_dotted_pair() {
        let dotted = Value::cons(Value::int(7), Value::int(8));
        assert_eq!(list_ref(&[dotted.clone(), Value::int(0)]), Ok(Value::int(7)));
        assert!(list_ref(&[dotted, Value::int(1)]).is_err());
    }

    #[test]
    fn test_higher_order_with_builtins() {
        let xs = list(&ints(&[1, 2, 3, 4])).unwrap();
        let negated = map(&[builtin("-"), xs.clone()]).unwrap();
        assert_eq!(negated.to_string(), "(-1 -2 -3 -4)");

        let zeros = filter(&[builtin("not"), list(&ints(&[0, 1, 0])).unwrap()]).unwrap();
        assert_eq!(zeros.to_string(), "(0 0)");

        assert_eq!(reduce(&[builtin("*"), xs, Value::int(1)]), Ok(Value::int(24)));
        assert!(map(&[Value::int(1), list(&ints(&[1])).unwrap()]).is_err());
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(greater(&ints(&[3, 2, 1])), Ok(Value::Bool(true)));
        assert_eq!(greater(&ints(&[3, 3, 1])), Ok(Value::Bool(false)));
        assert_eq!(greater_equal(&ints(&[3, 3, 1])), Ok(Value::Bool(true)));
        assert_eq!(less(&ints(&[1])), Ok(Value::Bool(true)));
        assert_eq!(less_equal(&[Value::int(1), Value::float(1.0)]), Ok(Value::Bool(true)));
        assert_eq!(equal(&ints(&[2, 2, 2])), Ok(Value::Bool(true)));
        assert_eq!(equal(&ints(&[2, 3])), Ok(Value::Bool(false)));
        assert_eq!(not(&[Value::Bool(false)]), Ok(Value::Bool(true)));
        assert!(less(&[Value::Nil, Value::int(1)]).is_err());
    }

    #[test]
    fn test_builtin_frame_constants() {
        let frame = builtin_frame();
        assert_eq!(frame.lookup("#t"), Ok(Value::Bool(true)));
        assert_eq!(frame.lookup("nil"), Ok(Value::Nil));
        assert!(BUILTINS.iter().all(|(name, _)| frame.contains(name)));
    }
}
