//! Instance methods (`a.push(x)`, `a.len()`).
//!
//! The builtin registry is exhaustive for *root-scope* bindings, but
//! `let a = [1,2,3]; a.push("x")` failing with a Type error only makes sense if
//! `List` exposes a `push` that mutates the receiver in place. Since `Value`'s `Core`
//! capability set says member access "looks up `b` in `a.fields()`" and
//! `BuiltinFunction` values carry no closed-over state, a `push` bound to one
//! particular list can't be handed out as an ordinary `fields()` entry without breaking
//! that invariant. Instead the evaluator's call/member dispatch checks this table
//! first, keyed by `(receiver kind, method name)`, before falling back to a generic
//! `fields()` lookup — the same two-step shape an arity/type check followed by the
//! actual operation gives an ordinary primop table, just keyed on the receiver's kind
//! rather than a global function name.

use crate::error::Error;
use crate::span::Span;
use crate::unwind::EvalResult;
use crate::value::{Value, ValueData, ValueKind};

/// Looks up and invokes an instance method. Returns `Ok(None)` if `name` is not a
/// recognized instance method for `receiver`'s kind, so the caller can fall back to
/// plain member lookup.
pub fn call_instance_method(
    receiver: &Value,
    name: &str,
    args: Vec<Value>,
    call_span: &Span,
) -> EvalResult<Option<Value>> {
    match (receiver.kind(), name) {
        (ValueKind::List, "push") => Ok(Some(list_push(receiver, args, call_span)?)),
        (ValueKind::List, "len") => Ok(Some(list_len(receiver, call_span)?)),
        (ValueKind::String, "len") => Ok(Some(string_len(receiver, call_span)?)),
        (ValueKind::Object, "len") => Ok(Some(object_len(receiver, call_span)?)),
        _ => Ok(None),
    }
}

fn expect_one_arg(args: Vec<Value>, call_span: &Span) -> EvalResult<Value> {
    let mut args = args;
    if args.len() != 1 {
        return Err(Error::type_error(
            format!("push expects exactly one argument, got {}", args.len()),
            call_span.clone(),
        )
        .into());
    }
    Ok(args.remove(0))
}

fn list_push(receiver: &Value, args: Vec<Value>, call_span: &Span) -> EvalResult<Value> {
    let value = expect_one_arg(args, call_span)?;
    let list = match &receiver.data {
        ValueData::List(list) => list,
        _ => unreachable!("dispatch guarantees List"),
    };
    let mut list = list.borrow_mut();
    let incoming_kind = value.kind();
    match list.element_kind {
        None => list.element_kind = Some(incoming_kind),
        Some(existing) if existing == incoming_kind => {}
        Some(existing) => {
            return Err(Error::type_error(
                format!(
                    "list<{}> rejects pushed value of type {}",
                    existing, incoming_kind
                ),
                call_span.clone(),
            )
            .into())
        }
    }
    list.items.push(value);
    Ok(Value::null(call_span.clone()))
}

fn list_len(receiver: &Value, call_span: &Span) -> EvalResult<Value> {
    let list = match &receiver.data {
        ValueData::List(list) => list,
        _ => unreachable!("dispatch guarantees List"),
    };
    Ok(Value::number(
        list.borrow().items.len() as f64,
        call_span.clone(),
    ))
}

fn string_len(receiver: &Value, call_span: &Span) -> EvalResult<Value> {
    let s = match &receiver.data {
        ValueData::String(s) => s,
        _ => unreachable!("dispatch guarantees String"),
    };
    Ok(Value::number(s.chars().count() as f64, call_span.clone()))
}

fn object_len(receiver: &Value, call_span: &Span) -> EvalResult<Value> {
    let obj = match &receiver.data {
        ValueData::Object(obj) => obj,
        _ => unreachable!("dispatch guarantees Object"),
    };
    Ok(Value::number(
        obj.borrow().fields.len() as f64,
        call_span.clone(),
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::span::Span;

    #[test]
    fn push_fixes_element_type_then_rejects_mismatches() {
        let list = Value::empty_list(Span::dummy());
        call_instance_method(&list, "push", vec![Value::number(1.0, Span::dummy())], &Span::dummy())
            .unwrap();
        call_instance_method(&list, "push", vec![Value::number(2.0, Span::dummy())], &Span::dummy())
            .unwrap();
        let err = call_instance_method(
            &list,
            "push",
            vec![Value::string("x", Span::dummy())],
            &Span::dummy(),
        )
        .unwrap_err();
        match err {
            crate::unwind::Unwind::Error(e) => assert_eq!(e.kind, crate::error::ErrorKind::Type),
            _ => panic!("expected Error"),
        }
    }

    #[test]
    fn unknown_method_returns_none() {
        let n = Value::number(1.0, Span::dummy());
        assert!(call_instance_method(&n, "push", vec![], &Span::dummy())
            .unwrap()
            .is_none());
    }
}
