//! Shared arity/type-check helpers for the builtin registry.
//!
//! Mirrors an `ArgParser`-style helper (`args.value(...)?`, `args.variable()?`,
//! `args.done()?`) in spirit — check shape before doing the op — but as free functions
//! over an already-evaluated `&[Value]` slice rather than a stateful cursor, since
//! builtins here receive their arguments pre-evaluated (`BuiltinFn`) instead of
//! unevaluated argument expressions.

use std::collections::BTreeMap;

use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::unwind::{EvalResult, Unwind};
use crate::value::{Value, ValueData};

/// `Value` methods (`is_truthy`, `display`, ...) return `EvalResult`, whose `Err` side
/// can in principle carry a program-exit signal; none of the operations builtins use
/// them for ever produce one, so this collapses the impossible case rather than forcing
/// every call site to thread it through a `BuiltinFn`'s `Result<_, Error>` signature.
pub fn no_exit<T>(result: EvalResult<T>) -> Result<T, Error> {
    match result {
        Ok(v) => Ok(v),
        Err(Unwind::Error(e)) => Err(e),
        Err(Unwind::Exit(_)) => unreachable!("value operations never signal program exit"),
    }
}

pub fn exact_arity(name: &str, args: &[Value], n: usize, span: &Span) -> Result<(), Error> {
    if args.len() != n {
        return Err(Error::type_error(
            format!("`{}` expects {} argument(s), got {}", name, n, args.len()),
            span.clone(),
        ));
    }
    Ok(())
}

pub fn arity_range(name: &str, args: &[Value], min: usize, max: usize, span: &Span) -> Result<(), Error> {
    if args.len() < min || args.len() > max {
        return Err(Error::type_error(
            format!(
                "`{}` expects between {} and {} arguments, got {}",
                name,
                min,
                max,
                args.len()
            ),
            span.clone(),
        ));
    }
    Ok(())
}

pub fn min_arity(name: &str, args: &[Value], min: usize, span: &Span) -> Result<(), Error> {
    if args.len() < min {
        return Err(Error::type_error(
            format!("`{}` expects at least {} argument(s), got {}", name, min, args.len()),
            span.clone(),
        ));
    }
    Ok(())
}

pub fn as_number(args: &[Value], idx: usize, span: &Span) -> Result<f64, Error> {
    match &args[idx].data {
        ValueData::Number(n) => Ok(*n),
        _ => Err(Error::bad_argument(idx + 1, "a number", span.clone())),
    }
}

pub fn as_int(args: &[Value], idx: usize, span: &Span) -> Result<i64, Error> {
    let n = as_number(args, idx, span)?;
    if n.fract() != 0.0 {
        return Err(Error::bad_argument(idx + 1, "an integer-valued number", span.clone()));
    }
    Ok(n as i64)
}

pub fn as_string<'a>(args: &'a [Value], idx: usize, span: &Span) -> Result<&'a str, Error> {
    match &args[idx].data {
        ValueData::String(s) => Ok(s.as_ref()),
        _ => Err(Error::bad_argument(idx + 1, "a string", span.clone())),
    }
}

pub fn as_bool(args: &[Value], idx: usize, span: &Span) -> Result<bool, Error> {
    match &args[idx].data {
        ValueData::Bool(b) => Ok(*b),
        _ => Err(Error::bad_argument(idx + 1, "a bool", span.clone())),
    }
}

pub fn as_object<'a>(args: &'a [Value], idx: usize, span: &Span) -> Result<&'a crate::value::ObjectRef, Error> {
    match &args[idx].data {
        ValueData::Object(obj) => Ok(obj),
        _ => Err(Error::bad_argument(idx + 1, "an object", span.clone())),
    }
}

/// Reads a field that's expected to be an integer-valued Number off an object, for
/// decoding the Date-shaped objects `time`'s functions pass around.
pub fn object_int_field(obj: &crate::value::ObjectRef, field: &str, span: &Span) -> Result<i64, Error> {
    let fields = obj.borrow();
    match fields.fields.get(field) {
        Some(Value {
            data: ValueData::Number(n),
            ..
        }) => Ok(*n as i64),
        Some(_) => Err(Error::type_error(format!("field `{}` must be a number", field), span.clone())),
        None => Err(Error::type_error(format!("missing field `{}`", field), span.clone())),
    }
}

/// Collects the trailing variadic `Pair` arguments used by `exec`/`http` into a
/// `name -> display(value)` map, rejecting duplicate keys: variadic
/// pair-argument builtins reject duplicate keys with a Value error.
pub fn collect_pairs(
    executor: &mut dyn Executor,
    args: &[Value],
    start: usize,
    span: &Span,
) -> Result<BTreeMap<String, String>, Error> {
    let mut map = BTreeMap::new();
    for (i, arg) in args[start..].iter().enumerate() {
        let (key, value) = match &arg.data {
            ValueData::Pair(k, v) => (k, v),
            _ => {
                return Err(Error::bad_argument(
                    start + i + 1,
                    "a pair (`name => value`)",
                    span.clone(),
                ))
            }
        };
        let key_str = match &key.data {
            ValueData::String(s) => s.to_string(),
            _ => return Err(Error::type_error("pair key must be a string", span.clone())),
        };
        if map.contains_key(&key_str) {
            return Err(Error::value(
                format!("duplicate argument `{}`", key_str),
                span.clone(),
            ));
        }
        let value_str = no_exit(value.display(executor))?;
        map.insert(key_str, value_str);
    }
    Ok(map)
}

pub fn host_err(span: &Span) -> impl FnOnce(crate::executor::HostError) -> Error + '_ {
    move |e| Error::runtime(e.message, span.clone())
}
