//! The `log` builtin, kept separate from `notify`/`remind` since it targets the
//! host's own log sink rather than a user-facing notification channel.

use indexmap::IndexMap;

use crate::builtins::args::{as_int, as_string, exact_arity, host_err};
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert("log".to_string(), Value::builtin_function("log", log));
}

fn log(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("log", &args, 3, span)?;
    let title = as_string(&args, 0, span)?;
    let body = as_string(&args, 1, span)?;
    let level = as_int(&args, 2, span)?;
    ex.log(title, body, level).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(Value::null(span.clone())))
}
