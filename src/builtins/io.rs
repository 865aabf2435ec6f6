//! I/O builtins: `print`, `println`, `debug`.
//!
//! All three accept any number of arguments, joining their display forms with a single
//! space — folding every argument through `Value::display` rather than requiring
//! exactly one.

use indexmap::IndexMap;

use crate::builtins::args::{host_err, no_exit};
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert("print".to_string(), Value::builtin_function("print", print));
    map.insert("println".to_string(), Value::builtin_function("println", println));
    map.insert("debug".to_string(), Value::builtin_function("debug", debug));
}

fn joined(ex: &mut dyn Executor, args: &[Value], debug_repr: bool) -> Result<String, Error> {
    let mut parts = Vec::with_capacity(args.len());
    for a in args {
        parts.push(if debug_repr {
            no_exit(a.debug(ex))?
        } else {
            no_exit(a.display(ex))?
        });
    }
    Ok(parts.join(" "))
}

fn print(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    let text = joined(ex, &args, false)?;
    ex.print(&text).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(Value::null(span.clone())))
}

fn println(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    let text = joined(ex, &args, false)?;
    ex.println(&text).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(Value::null(span.clone())))
}

fn debug(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    let text = joined(ex, &args, true)?;
    ex.println(&text).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(Value::null(span.clone())))
}
