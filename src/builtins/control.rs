//! Control builtins: `exit`, `throw`, `assert`.

use indexmap::IndexMap;

use crate::builtins::args::{as_string, exact_arity, no_exit};
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert("exit".to_string(), Value::builtin_function("exit", exit));
    map.insert("throw".to_string(), Value::builtin_function("throw", throw));
    map.insert("assert".to_string(), Value::builtin_function("assert", assert_fn));
}

fn exit(_ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("exit", &args, 1, span)?;
    let code = crate::builtins::args::as_int(&args, 0, span)?;
    Ok(BuiltinReturn::Exit(code as i32))
}

fn throw(_ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("throw", &args, 1, span)?;
    let message = as_string(&args, 0, span)?.to_string();
    Err(Error::throw(message, span.clone()))
}

fn assert_fn(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    crate::builtins::args::arity_range("assert", &args, 1, 2, span)?;
    let ok = no_exit(args[0].is_truthy(ex))?;
    if !ok {
        let message = if args.len() == 2 {
            as_string(&args, 1, span)?.to_string()
        } else {
            "assertion failed".to_string()
        };
        return Err(Error::value(message, span.clone()));
    }
    Ok(BuiltinReturn::Value(Value::null(span.clone())))
}
