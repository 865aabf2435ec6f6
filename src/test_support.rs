//! A no-op `Executor` for unit tests that never touch the host. Integration
//! tests (`tests/end_to_end.rs`) use a slightly richer in-memory fake instead.

use std::collections::BTreeMap;

use crate::executor::{
    DateTime, Executor, ExecResult, HostError, HostResult, HttpResponse, ResolvedModule,
    SwitchInfo, Weather,
};

#[derive(Default)]
pub struct NullExecutor {
    pub printed: Vec<String>,
    /// When set, reported back through [`Executor::is_analyzer`] so tests can exercise
    /// analyzer-mode recovery without a second Executor impl.
    pub analyzer: bool,
}

impl Executor for NullExecutor {
    fn print(&mut self, text: &str) -> HostResult<()> {
        self.printed.push(text.to_string());
        Ok(())
    }

    fn println(&mut self, text: &str) -> HostResult<()> {
        self.printed.push(format!("{}\n", text));
        Ok(())
    }

    fn get_switch(&mut self, _id: &str) -> HostResult<SwitchInfo> {
        Err(HostError::new("no switches in NullExecutor"))
    }

    fn switch(&mut self, _id: &str, _power: bool) -> HostResult<()> {
        Err(HostError::new("no switches in NullExecutor"))
    }

    fn ping(&mut self, _ip: &str, _timeout_seconds: f64) -> HostResult<bool> {
        Ok(false)
    }

    fn notify(&mut self, _title: &str, _body: &str, _level: i64) -> HostResult<()> {
        Ok(())
    }

    fn remind(&mut self, _title: &str, _body: &str, _urgency: i64, _date: DateTime) -> HostResult<i64> {
        Ok(0)
    }

    fn log(&mut self, _title: &str, _body: &str, _level: i64) -> HostResult<()> {
        Ok(())
    }

    fn exec(&mut self, _script_id: &str, _args: BTreeMap<String, String>) -> HostResult<ExecResult> {
        Err(HostError::new("exec unsupported in NullExecutor"))
    }

    fn resolve_module(&mut self, _id: &str) -> HostResult<ResolvedModule> {
        Ok(ResolvedModule {
            code: String::new(),
            filename: String::new(),
            found: false,
            usable: false,
        })
    }

    fn read_file(&mut self, _path: &str) -> HostResult<String> {
        Err(HostError::new("filesystem unsupported in NullExecutor"))
    }

    fn get(&mut self, _url: &str) -> HostResult<HttpResponse> {
        Err(HostError::new("http unsupported in NullExecutor"))
    }

    fn http(
        &mut self,
        _url: &str,
        _method: &str,
        _body: &str,
        _headers: &[(String, String)],
        _cookies: &[(String, String)],
    ) -> HostResult<HttpResponse> {
        Err(HostError::new("http unsupported in NullExecutor"))
    }

    fn get_storage(&mut self, _key: &str) -> HostResult<Option<String>> {
        Ok(None)
    }

    fn set_storage(&mut self, _key: &str, _value: &str) -> HostResult<()> {
        Ok(())
    }

    fn get_user(&mut self) -> String {
        "test-user".to_string()
    }

    fn get_weather(&mut self) -> HostResult<Weather> {
        Err(HostError::new("weather unsupported in NullExecutor"))
    }

    fn now(&mut self) -> DateTime {
        DateTime {
            year: 1970,
            month: 1,
            week: 1,
            week_day: 4,
            calendar_day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            unix_millis: 0,
        }
    }

    fn is_analyzer(&self) -> bool {
        self.analyzer
    }
}
