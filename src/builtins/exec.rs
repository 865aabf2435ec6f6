//! The `exec` builtin: runs another Homescript by id on the host, passing
//! named arguments as pairs.

use indexmap::IndexMap;

use crate::builtins::args::{as_string, collect_pairs, host_err, min_arity};
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert("exec".to_string(), Value::builtin_function("exec", exec));
}

fn exec(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    min_arity("exec", &args, 1, span)?;
    let id = as_string(&args, 0, span)?.to_string();
    let script_args = collect_pairs(ex, &args, 1, span)?;
    let result = ex.exec(&id, script_args).map_err(host_err(span))?;

    let mut fields = IndexMap::new();
    fields.insert("elapsed".to_string(), Value::number(result.runtime_secs, span.clone()));
    fields.insert(
        "value".to_string(),
        Value::string(result.return_value, span.clone()),
    );
    Ok(BuiltinReturn::Value(Value::object("exec_result", false, fields, span.clone())))
}
