//! Builtin variables: `user`, `weather`. Both are `BuiltinVariable`s, so they're
//! demand-evaluated on every use (`Value::resolve`) rather than snapshotted once at
//! script start.

use indexmap::IndexMap;

use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::Value;

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert("user".to_string(), Value::builtin_variable("user", user));
    map.insert("weather".to_string(), Value::builtin_variable("weather", weather));
}

fn user(ex: &mut dyn Executor, span: &Span) -> Result<Value, Error> {
    Ok(Value::string(ex.get_user(), span.clone()))
}

fn weather(ex: &mut dyn Executor, span: &Span) -> Result<Value, Error> {
    let w = ex
        .get_weather()
        .map_err(|e| Error::runtime(e.message, span.clone()))?;
    let mut fields = IndexMap::new();
    fields.insert("title".to_string(), Value::string(w.title, span.clone()));
    fields.insert(
        "description".to_string(),
        Value::string(w.description, span.clone()),
    );
    fields.insert(
        "temperature".to_string(),
        Value::number(w.temperature, span.clone()),
    );
    fields.insert(
        "feels_like".to_string(),
        Value::number(w.feels_like, span.clone()),
    );
    fields.insert("humidity".to_string(), Value::number(w.humidity, span.clone()));
    Ok(Value::object("weather", false, fields, span.clone()))
}
