//! HTTP builtins: `get`, `http`, `ping`.
//!
//! `Executor::http` takes headers and cookies as two separate slices, but Homescript
//! only has one variadic pair-argument shape to offer them in. Pairs whose key starts
//! with `cookie:` become cookies (with the prefix stripped); everything else is a
//! header. Recorded as a decision in `DESIGN.md` since the registry doesn't spell it out.

use indexmap::IndexMap;

use crate::builtins::args::{as_number, as_string, collect_pairs, exact_arity, host_err, min_arity};
use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert("get".to_string(), Value::builtin_function("get", get));
    map.insert("http".to_string(), Value::builtin_function("http", http));
    map.insert("ping".to_string(), Value::builtin_function("ping", ping));
}

fn response_to_value(resp: crate::executor::HttpResponse, span: &Span) -> Value {
    let mut fields = IndexMap::new();
    fields.insert("status".to_string(), Value::string(resp.status, span.clone()));
    fields.insert(
        "status_code".to_string(),
        Value::number(resp.status_code as f64, span.clone()),
    );
    fields.insert("body".to_string(), Value::string(resp.body, span.clone()));
    Value::object("http_response", false, fields, span.clone())
}

fn get(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("get", &args, 1, span)?;
    let url = as_string(&args, 0, span)?;
    let resp = ex.get(url).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(response_to_value(resp, span)))
}

fn http(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    min_arity("http", &args, 3, span)?;
    let url = as_string(&args, 0, span)?.to_string();
    let method = as_string(&args, 1, span)?.to_string();
    let body = as_string(&args, 2, span)?.to_string();
    let pairs = collect_pairs(ex, &args, 3, span)?;

    let mut headers = Vec::new();
    let mut cookies = Vec::new();
    for (k, v) in pairs {
        match k.strip_prefix("cookie:") {
            Some(cookie_name) => cookies.push((cookie_name.to_string(), v)),
            None => headers.push((k, v)),
        }
    }

    let resp = ex
        .http(&url, &method, &body, &headers, &cookies)
        .map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(response_to_value(resp, span)))
}

fn ping(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("ping", &args, 2, span)?;
    let ip = as_string(&args, 0, span)?.to_string();
    let timeout = as_number(&args, 1, span)?;
    let reachable = ex.ping(&ip, timeout).map_err(host_err(span))?;
    Ok(BuiltinReturn::Value(Value::boolean(reachable, span.clone())))
}
