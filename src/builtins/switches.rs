//! Switch builtins: `get_switch`, `switch`.

use indexmap::IndexMap;

use crate::builtins::args::{as_bool, as_string, exact_arity, host_err};
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert("get_switch".to_string(), Value::builtin_function("get_switch", get_switch));
    map.insert("switch".to_string(), Value::builtin_function("switch", switch));
}

fn get_switch(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("get_switch", &args, 1, span)?;
    let id = as_string(&args, 0, span)?.to_string();
    let info = ex.get_switch(&id).map_err(host_err(span))?;

    let mut fields = IndexMap::new();
    fields.insert("name".to_string(), Value::string(info.name, span.clone()));
    fields.insert("power".to_string(), Value::boolean(info.power, span.clone()));
    fields.insert("watts".to_string(), Value::number(info.watts, span.clone()));
    Ok(BuiltinReturn::Value(Value::object("switch", false, fields, span.clone())))
}

fn switch(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("switch", &args, 2, span)?;
    let id = as_string(&args, 0, span)?.to_string();
    let power = as_bool(&args, 1, span)?;
    ex.switch(&id, power).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(Value::null(span.clone())))
}
