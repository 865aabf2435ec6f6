//! The `time` builtin variable: `now`, `since`, `add_days`, `add_hours`,
//! `add_minutes`, `sleep`.
//!
//! `now()` is the only one of these that needs the host (`Executor::now`); the rest are
//! pure date arithmetic over the Date object shape builtins expose, so they're
//! implemented with `chrono` directly rather than routed through the `Executor` trait —
//! `chrono` is already part of this crate's dependency stack (`Cargo.toml`), just never
//! previously reached for outside the host-facing edge. `sleep` is special-cased by the
//! evaluator (`src/evaluator.rs`) instead of living here as an ordinary `BuiltinFn`,
//! since it needs the cancellation token, which a stateless `BuiltinFn` has no way
//! to receive; see `DESIGN.md`.

use chrono::{Datelike, TimeZone, Timelike, Utc};
use indexmap::IndexMap;

use crate::builtins::args::{as_int, exact_arity, object_int_field};
use crate::error::Error;
use crate::executor::{DateTime, Executor};
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

/// The name the evaluator matches on to special-case `sleep`.
pub const SLEEP_NAME: &str = "time.sleep";

pub fn register(map: &mut IndexMap<String, Value>) {
    let mut fields = IndexMap::new();
    fields.insert("now".to_string(), Value::builtin_function("time.now", now));
    fields.insert("since".to_string(), Value::builtin_function("time.since", since));
    fields.insert("add_days".to_string(), Value::builtin_function("time.add_days", add_days));
    fields.insert("add_hours".to_string(), Value::builtin_function("time.add_hours", add_hours));
    fields.insert(
        "add_minutes".to_string(),
        Value::builtin_function("time.add_minutes", add_minutes),
    );
    // A placeholder entry; the evaluator intercepts calls to it before ever invoking
    // this function pointer (see module doc comment).
    fields.insert("sleep".to_string(), Value::builtin_function(SLEEP_NAME, unreachable_sleep));
    let mut time_obj = Value::object("time", false, fields, Span::dummy());
    time_obj.protected = true;
    map.insert("time".to_string(), time_obj);
}

fn unreachable_sleep(_ex: &mut dyn Executor, span: &Span, _args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    Err(Error::runtime(
        "time.sleep must be intercepted by the evaluator before reaching this point",
        span.clone(),
    ))
}

/// Builds the Date object shape from a host `DateTime`.
pub fn date_to_value(dt: DateTime, span: &Span) -> Value {
    let mut fields = IndexMap::new();
    fields.insert("year".to_string(), Value::number(dt.year as f64, span.clone()));
    fields.insert("month".to_string(), Value::number(dt.month as f64, span.clone()));
    fields.insert("week".to_string(), Value::number(dt.week as f64, span.clone()));
    fields.insert("week_day".to_string(), Value::number(dt.week_day as f64, span.clone()));
    fields.insert(
        "week_day_text".to_string(),
        Value::string(weekday_name(dt.week_day), span.clone()),
    );
    fields.insert(
        "calendar_day".to_string(),
        Value::number(dt.calendar_day as f64, span.clone()),
    );
    fields.insert("hour".to_string(), Value::number(dt.hour as f64, span.clone()));
    fields.insert("minute".to_string(), Value::number(dt.minute as f64, span.clone()));
    fields.insert("second".to_string(), Value::number(dt.second as f64, span.clone()));
    fields.insert("unix".to_string(), Value::number(dt.unix_millis as f64, span.clone()));
    Value::object("date", false, fields, span.clone())
}

fn weekday_name(week_day: i64) -> &'static str {
    match week_day {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Sunday",
    }
}

/// Reads a Date object's `unix` field back into a host `DateTime`, recomputing the
/// calendar fields with `chrono` so they stay consistent with the (possibly adjusted)
/// timestamp.
pub fn value_to_datetime(v: &Value, span: &Span) -> Result<DateTime, Error> {
    let obj = match &v.data {
        crate::value::ValueData::Object(obj) => obj,
        _ => return Err(Error::type_error("expected a date object", span.clone())),
    };
    let unix_millis = object_int_field(obj, "unix", span)?;
    Ok(datetime_from_millis(unix_millis))
}

fn datetime_from_millis(unix_millis: i64) -> DateTime {
    let ndt = Utc.timestamp_millis_opt(unix_millis).single().unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap());
    DateTime {
        year: ndt.year() as i64,
        month: ndt.month() as i64,
        week: ndt.iso_week().week() as i64,
        week_day: ndt.weekday().number_from_monday() as i64,
        calendar_day: ndt.day() as i64,
        hour: ndt.hour() as i64,
        minute: ndt.minute() as i64,
        second: ndt.second() as i64,
        unix_millis,
    }
}

fn now(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("time.now", &args, 0, span)?;
    Ok(BuiltinReturn::Value(date_to_value(ex.now(), span)))
}

fn since(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    exact_arity("time.since", &args, 1, span)?;
    let then = value_to_datetime(&args[0], span)?;
    let now_millis = ex.now().unix_millis;
    let elapsed_secs = (now_millis - then.unix_millis) as f64 / 1000.0;
    Ok(BuiltinReturn::Value(Value::number(elapsed_secs, span.clone())))
}

fn add_days(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    add_duration(ex, span, args, "time.add_days", |n| chrono::Duration::days(n))
}

fn add_hours(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    add_duration(ex, span, args, "time.add_hours", |n| chrono::Duration::hours(n))
}

fn add_minutes(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    add_duration(ex, span, args, "time.add_minutes", |n| chrono::Duration::minutes(n))
}

fn add_duration(
    _ex: &mut dyn Executor,
    span: &Span,
    args: Vec<Value>,
    name: &str,
    to_duration: impl Fn(i64) -> chrono::Duration,
) -> Result<BuiltinReturn, Error> {
    exact_arity(name, &args, 2, span)?;
    let base = value_to_datetime(&args[0], span)?;
    let amount = as_int(&args, 1, span)?;
    let shifted_millis = base.unix_millis + to_duration(amount).num_milliseconds();
    Ok(BuiltinReturn::Value(date_to_value(datetime_from_millis(shifted_millis), span)))
}
