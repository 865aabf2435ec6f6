//! Notification builtins: `notify`, `remind`.

use indexmap::IndexMap;

use crate::builtins::args::{as_int, as_string, exact_arity, host_err};
use crate::builtins::time::value_to_datetime;
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert("notify".to_string(), Value::builtin_function("notify", notify));
    map.insert("remind".to_string(), Value::builtin_function("remind", remind));
}

fn notify(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("notify", &args, 3, span)?;
    let title = as_string(&args, 0, span)?;
    let body = as_string(&args, 1, span)?;
    let level = as_int(&args, 2, span)?;
    ex.notify(title, body, level).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(Value::null(span.clone())))
}

fn remind(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("remind", &args, 4, span)?;
    let title = as_string(&args, 0, span)?;
    let body = as_string(&args, 1, span)?;
    let urgency = as_int(&args, 2, span)?;
    let date = value_to_datetime(&args[3], span)?;
    let id = ex.remind(title, body, urgency, date).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(Value::number(id as f64, span.clone())))
}
