//! The `fmt` builtin: positional `{}` placeholder substitution, built on
//! `format!`-based display helpers rather than a hand-rolled printf dialect.

use indexmap::IndexMap;

use crate::builtins::args::{as_string, no_exit};
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert("fmt".to_string(), Value::builtin_function("fmt", fmt));
}

fn fmt(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    if args.is_empty() {
        return Err(Error::bad_argument(1, "a format string", span.clone()));
    }
    let format = as_string(&args, 0, span)?.to_string();
    let placeholders = format.matches("{}").count();
    if placeholders != args.len() - 1 {
        return Err(Error::value(
            format!(
                "`fmt` format string has {} placeholder(s) but {} argument(s) were given",
                placeholders,
                args.len() - 1
            ),
            span.clone(),
        ));
    }

    let mut out = String::with_capacity(format.len());
    let mut rest = format.as_str();
    for arg in &args[1..] {
        match rest.find("{}") {
            Some(pos) => {
                out.push_str(&rest[..pos]);
                out.push_str(&no_exit(arg.display(ex))?);
                rest = &rest[pos + 2..];
            }
            None => unreachable!("placeholder count was checked above"),
        }
    }
    out.push_str(rest);

    Ok(BuiltinReturn::Value(Value::string(out, span.clone())))
}
