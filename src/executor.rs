//! The host-callout interface.
//!
//! Every host-observable effect — I/O, switches, notifications, HTTP, storage, time —
//! is routed through this trait. Builtins (`src/builtins/`) hold a `&mut dyn Executor`
//! and translate `HostError` into a Homescript Runtime error. Shaped after an
//! `ExtensionValue`/host-callback pattern, generalized from "extend the Value enum" to
//! "call out to the embedding application."

use std::collections::BTreeMap;

use snafu::Snafu;

/// An error raised by the host while servicing an Executor call. Always surfaces into
/// Homescript as a Runtime error carrying `message`.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("{message}"))]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchInfo {
    pub name: String,
    pub power: bool,
    pub watts: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: String,
    pub status_code: i64,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecResult {
    pub runtime_secs: f64,
    pub return_value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    pub code: String,
    pub filename: String,
    pub found: bool,
    pub usable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub title: String,
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
}

/// A host-provided point in time, matching the `Date object` shape builtins expose
/// (unix in milliseconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateTime {
    pub year: i64,
    pub month: i64,
    pub week: i64,
    pub week_day: i64,
    pub calendar_day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
    pub unix_millis: i64,
}

/// The host object implementing every side-effectful primitive.
///
/// Methods take `&mut self` uniformly since a real host (an HTTP client with
/// connection reuse, a storage backend with a write buffer) will usually need it even
/// where the interface is conceptually read-only.
pub trait Executor {
    fn print(&mut self, text: &str) -> HostResult<()>;
    fn println(&mut self, text: &str) -> HostResult<()>;

    fn get_switch(&mut self, id: &str) -> HostResult<SwitchInfo>;
    fn switch(&mut self, id: &str, power: bool) -> HostResult<()>;

    fn ping(&mut self, ip: &str, timeout_seconds: f64) -> HostResult<bool>;

    fn notify(&mut self, title: &str, body: &str, level: i64) -> HostResult<()>;
    fn remind(&mut self, title: &str, body: &str, urgency: i64, date: DateTime) -> HostResult<i64>;

    fn log(&mut self, title: &str, body: &str, level: i64) -> HostResult<()>;

    fn exec(&mut self, script_id: &str, args: BTreeMap<String, String>) -> HostResult<ExecResult>;

    fn resolve_module(&mut self, id: &str) -> HostResult<ResolvedModule>;
    fn read_file(&mut self, path: &str) -> HostResult<String>;

    fn get(&mut self, url: &str) -> HostResult<HttpResponse>;
    #[allow(clippy::too_many_arguments)]
    fn http(
        &mut self,
        url: &str,
        method: &str,
        body: &str,
        headers: &[(String, String)],
        cookies: &[(String, String)],
    ) -> HostResult<HttpResponse>;

    fn get_storage(&mut self, key: &str) -> HostResult<Option<String>>;
    fn set_storage(&mut self, key: &str, value: &str) -> HostResult<()>;

    fn get_user(&mut self) -> String;
    fn get_weather(&mut self) -> HostResult<Weather>;

    fn now(&mut self) -> DateTime;

    /// Lets builtins skip real effects in analyzer/dry-run mode.
    fn is_analyzer(&self) -> bool;
}
