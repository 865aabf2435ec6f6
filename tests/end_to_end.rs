//! Black-box scenarios run through the public `parse`/`run` entry points.
//!
//! Uses a richer in-memory fake `Executor` than `test_support::NullExecutor` so storage,
//! switches and http round-trip instead of erroring, covering more of the host-callout
//! surface than the unit tests inside `src/evaluator.rs` exercise.

use std::collections::{BTreeMap, HashMap};

use homescript::executor::{
    DateTime, ExecResult, HostError, HostResult, HttpResponse, ResolvedModule, SwitchInfo, Weather,
};
use homescript::{cancel::CancelToken, Executor};
use indexmap::IndexMap;

#[derive(Default)]
struct FakeHost {
    printed: String,
    storage: HashMap<String, String>,
    switches: HashMap<String, SwitchInfo>,
}

impl Executor for FakeHost {
    fn print(&mut self, text: &str) -> HostResult<()> {
        self.printed.push_str(text);
        Ok(())
    }

    fn println(&mut self, text: &str) -> HostResult<()> {
        self.printed.push_str(text);
        self.printed.push('\n');
        Ok(())
    }

    fn get_switch(&mut self, id: &str) -> HostResult<SwitchInfo> {
        self.switches
            .get(id)
            .cloned()
            .ok_or_else(|| HostError::new(format!("no such switch `{}`", id)))
    }

    fn switch(&mut self, id: &str, power: bool) -> HostResult<()> {
        self.switches
            .entry(id.to_string())
            .or_insert_with(|| SwitchInfo {
                name: id.to_string(),
                power: false,
                watts: 0.0,
            })
            .power = power;
        Ok(())
    }

    fn ping(&mut self, _ip: &str, _timeout_seconds: f64) -> HostResult<bool> {
        Ok(true)
    }

    fn notify(&mut self, _title: &str, _body: &str, _level: i64) -> HostResult<()> {
        Ok(())
    }

    fn remind(&mut self, _title: &str, _body: &str, _urgency: i64, _date: DateTime) -> HostResult<i64> {
        Ok(1)
    }

    fn log(&mut self, _title: &str, _body: &str, _level: i64) -> HostResult<()> {
        Ok(())
    }

    fn exec(&mut self, _script_id: &str, _args: BTreeMap<String, String>) -> HostResult<ExecResult> {
        Ok(ExecResult {
            runtime_secs: 0.0,
            return_value: String::new(),
        })
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
        Err(HostError::new("no filesystem in this fake host"))
    }

    fn get(&mut self, _url: &str) -> HostResult<HttpResponse> {
        Ok(HttpResponse {
            status: "OK".to_string(),
            status_code: 200,
            body: "fake-body".to_string(),
        })
    }

    fn http(
        &mut self,
        _url: &str,
        _method: &str,
        _body: &str,
        _headers: &[(String, String)],
        _cookies: &[(String, String)],
    ) -> HostResult<HttpResponse> {
        Ok(HttpResponse {
            status: "OK".to_string(),
            status_code: 200,
            body: "fake-body".to_string(),
        })
    }

    fn get_storage(&mut self, key: &str) -> HostResult<Option<String>> {
        Ok(self.storage.get(key).cloned())
    }

    fn set_storage(&mut self, key: &str, value: &str) -> HostResult<()> {
        self.storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_user(&mut self) -> String {
        "fixture-user".to_string()
    }

    fn get_weather(&mut self) -> HostResult<Weather> {
        Ok(Weather {
            title: "Clear".to_string(),
            description: "clear sky".to_string(),
            temperature: 20.0,
            feels_like: 19.0,
            humidity: 40.0,
        })
    }

    fn now(&mut self) -> DateTime {
        DateTime {
            year: 2024,
            month: 6,
            week: 24,
            week_day: 1,
            calendar_day: 10,
            hour: 12,
            minute: 0,
            second: 0,
            unix_millis: 1_718_020_800_000,
        }
    }

    fn is_analyzer(&self) -> bool {
        false
    }
}

fn run(src: &str) -> (FakeHost, Result<(homescript::Value, i32), homescript::Error>) {
    let (module, errors) = homescript::parse(src, "<e2e>");
    assert!(errors.is_empty(), "parse errors: {:?}", errors);
    let mut host = FakeHost::default();
    let result = homescript::run(
        &module,
        &mut host,
        IndexMap::new(),
        homescript::scope::DEFAULT_STACK_LIMIT,
        CancelToken::inert(),
    );
    (host, result)
}

#[test]
fn scenario_1_power_operator() {
    let (host, result) = run("let x = 2; let y = 3; print(x ** y);");
    result.unwrap();
    assert_eq!(host.printed, "8");
}

#[test]
fn integer_division_truncates_while_plain_division_stays_float() {
    let (host, result) = run(r#"print(7 // 2); print(" "); print(7 / 2);"#);
    result.unwrap();
    assert_eq!(host.printed, "3 3.5");
}

#[test]
fn scenario_2_for_loop_prints_range() {
    let (host, result) = run("for i in 0..3 { print(i); }");
    result.unwrap();
    assert_eq!(host.printed, "012");
}

#[test]
fn scenario_3_recursive_factorial() {
    let (host, result) = run("fn fact(n) { if n <= 1 { return 1; } return n * fact(n - 1); } print(fact(5));");
    result.unwrap();
    assert_eq!(host.printed, "120");
}

#[test]
fn scenario_4_try_catch_prints_message() {
    let (host, result) = run(r#"try { throw("boom"); } catch e { print(e.message); }"#);
    result.unwrap();
    assert_eq!(host.printed, "boom");
}

#[test]
fn scenario_5_list_push_type_mismatch_fails() {
    let (_host, result) = run(r#"let a = [1, 2, 3]; a.push("x");"#);
    let err = result.unwrap_err();
    assert_eq!(err.kind, homescript::error::ErrorKind::Type);
}

#[test]
fn failed_assertion_is_a_value_error_not_caught_by_try_catch() {
    let (host, result) = run(r#"try { assert(1 == 2, "nope"); } catch e { print("caught"); }"#);
    let err = result.unwrap_err();
    assert_eq!(err.kind, homescript::error::ErrorKind::Value);
    assert_eq!(host.printed, "");
}

#[test]
fn scenario_6_break_with_value_from_while_true() {
    let (_host, result) = run("let i = 0; while true { if i == 3 { break i; } i += 1; }");
    let (value, code) = result.unwrap();
    assert_eq!(code, 0);
    assert!(matches!(value.data, homescript::value::ValueData::Number(n) if n == 3.0));
}

#[test]
fn scenario_7_exit_stops_before_later_statements() {
    let (host, result) = run("exit(7); print(\"unreachable\");");
    let (_value, code) = result.unwrap();
    assert_eq!(code, 7);
    assert_eq!(host.printed, "");
}

#[test]
fn scenario_8_unbounded_recursion_overflows_with_partial_output() {
    let (module, errors) = homescript::parse(
        "fn f() { print(\"x\"); f(); } f();",
        "<e2e>",
    );
    assert!(errors.is_empty());
    let mut host = FakeHost::default();
    let err = homescript::run(
        &module,
        &mut host,
        IndexMap::new(),
        32,
        CancelToken::inert(),
    )
    .unwrap_err();
    assert_eq!(err.kind, homescript::error::ErrorKind::StackOverflow);
    assert!(!host.printed.is_empty());
}

#[test]
fn switch_round_trips_through_the_host() {
    let (_host, result) = run(
        r#"
        switch("lamp", true);
        let info = get_switch("lamp");
        print(info.power);
        "#,
    );
    result.unwrap();
}

#[test]
fn storage_round_trips_through_the_host() {
    let (host, result) = run(r#"storage.set("k", "v"); print(storage.get("k"));"#);
    result.unwrap();
    assert_eq!(host.printed, "v");
}
