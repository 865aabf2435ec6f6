//! The `storage` builtin variable: `get`, `set`.

use indexmap::IndexMap;

use crate::builtins::args::{as_string, exact_arity, host_err};
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub fn register(map: &mut IndexMap<String, Value>) {
    let mut fields = IndexMap::new();
    fields.insert("get".to_string(), Value::builtin_function("storage.get", get));
    fields.insert("set".to_string(), Value::builtin_function("storage.set", set));
    let mut storage_obj = Value::object("storage", false, fields, Span::dummy());
    storage_obj.protected = true;
    map.insert("storage".to_string(), storage_obj);
}

fn get(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("storage.get", &args, 1, span)?;
    let key = as_string(&args, 0, span)?;
    let value = ex.get_storage(key).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(match value {
        Some(s) => Value::string(s, span.clone()),
        None => Value::null(span.clone()),
    }))
}

fn set(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("storage.set", &args, 2, span)?;
    let key = as_string(&args, 0, span)?.to_string();
    let value = as_string(&args, 1, span)?.to_string();
    ex.set_storage(&key, &value).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(Value::null(span.clone())))
}
