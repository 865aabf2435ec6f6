//! `homescript` - runs a `.hms` script to completion against a real host environment.
//!
//! Storage is a process-lifetime in-memory map rather than anything durable, and
//! switches/weather/exec have no real home-automation backend to call into standalone
//! (module import resolution and any particular host are explicitly out of scope
//! for the execution core this crate implements); `LiveExecutor` below wires `print`,
//! HTTP, the system clock and storage to real effects and reports `HostError` for the
//! rest, exactly as an embedder with no such backend configured would see.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use structopt::StructOpt;

use homescript::executor::{
    DateTime, ExecResult, HostError, HostResult, HttpResponse, ResolvedModule, SwitchInfo, Weather,
};
use homescript::{cancel::CancelToken, Executor};

#[derive(Debug, StructOpt)]
#[structopt(name = "homescript", about = "Run a home-automation rule script")]
struct Opt {
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,

    /// Recursion depth limit; falls back to the built-in default if omitted.
    #[structopt(long = "stack-limit")]
    stack_limit: Option<usize>,

    /// The `.hms` source file to run.
    #[structopt(parse(from_os_str))]
    source: PathBuf,
}

struct LiveExecutor {
    storage: HashMap<String, String>,
}

impl LiveExecutor {
    fn new() -> Self {
        Self {
            storage: HashMap::new(),
        }
    }
}

impl Executor for LiveExecutor {
    fn print(&mut self, text: &str) -> HostResult<()> {
        print!("{}", text);
        Ok(())
    }

    fn println(&mut self, text: &str) -> HostResult<()> {
        println!("{}", text);
        Ok(())
    }

    fn get_switch(&mut self, _id: &str) -> HostResult<SwitchInfo> {
        Err(HostError::new("no switch backend configured"))
    }

    fn switch(&mut self, _id: &str, _power: bool) -> HostResult<()> {
        Err(HostError::new("no switch backend configured"))
    }

    fn ping(&mut self, ip: &str, timeout_seconds: f64) -> HostResult<bool> {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs_f64(timeout_seconds.max(0.1)))
            .build();
        Ok(agent.get(&format!("http://{}", ip)).call().is_ok())
    }

    fn notify(&mut self, title: &str, body: &str, level: i64) -> HostResult<()> {
        log::info!("[notify:{}] {} - {}", level, title, body);
        Ok(())
    }

    fn remind(&mut self, title: &str, body: &str, urgency: i64, _date: DateTime) -> HostResult<i64> {
        log::info!("[remind:{}] {} - {}", urgency, title, body);
        Ok(0)
    }

    fn log(&mut self, title: &str, body: &str, level: i64) -> HostResult<()> {
        match level {
            0 => log::trace!("{}: {}", title, body),
            1 => log::debug!("{}: {}", title, body),
            2 => log::info!("{}: {}", title, body),
            3 => log::warn!("{}: {}", title, body),
            _ => log::error!("{}: {}", title, body),
        }
        Ok(())
    }

    fn exec(&mut self, _script_id: &str, _args: BTreeMap<String, String>) -> HostResult<ExecResult> {
        Err(HostError::new("no script execution backend configured"))
    }

    fn resolve_module(&mut self, _id: &str) -> HostResult<ResolvedModule> {
        Ok(ResolvedModule {
            code: String::new(),
            filename: String::new(),
            found: false,
            usable: false,
        })
    }

    fn read_file(&mut self, path: &str) -> HostResult<String> {
        std::fs::read_to_string(path).map_err(|e| HostError::new(e.to_string()))
    }

    fn get(&mut self, url: &str) -> HostResult<HttpResponse> {
        self.http(url, "GET", "", &[], &[])
    }

    fn http(
        &mut self,
        url: &str,
        method: &str,
        body: &str,
        headers: &[(String, String)],
        cookies: &[(String, String)],
    ) -> HostResult<HttpResponse> {
        let agent = ureq::AgentBuilder::new().timeout(Duration::from_secs(30)).build();
        let mut request = agent.request(method, url);
        for (k, v) in headers {
            request = request.set(k, v);
        }
        if !cookies.is_empty() {
            let cookie_header = cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            request = request.set("Cookie", &cookie_header);
        }
        let result = if body.is_empty() {
            request.call()
        } else {
            request.send_string(body)
        };
        match result {
            Ok(resp) => Ok(HttpResponse {
                status: resp.status_text().to_string(),
                status_code: resp.status() as i64,
                body: resp.into_string().map_err(|e| HostError::new(e.to_string()))?,
            }),
            Err(ureq::Error::Status(code, resp)) => Ok(HttpResponse {
                status: resp.status_text().to_string(),
                status_code: code as i64,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(HostError::new(e.to_string())),
        }
    }

    fn get_storage(&mut self, key: &str) -> HostResult<Option<String>> {
        Ok(self.storage.get(key).cloned())
    }

    fn set_storage(&mut self, key: &str, value: &str) -> HostResult<()> {
        self.storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_user(&mut self) -> String {
        std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
    }

    fn get_weather(&mut self) -> HostResult<Weather> {
        Err(HostError::new("no weather backend configured"))
    }

    fn now(&mut self) -> DateTime {
        let now = chrono::Utc::now();
        use chrono::{Datelike, Timelike};
        DateTime {
            year: now.year() as i64,
            month: now.month() as i64,
            week: now.iso_week().week() as i64,
            week_day: now.weekday().number_from_monday() as i64,
            calendar_day: now.day() as i64,
            hour: now.hour() as i64,
            minute: now.minute() as i64,
            second: now.second() as i64,
            unix_millis: now.timestamp_millis(),
        }
    }

    fn is_analyzer(&self) -> bool {
        false
    }
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    let level = if opt.verbose { log::Level::Trace } else { log::Level::Info };
    simple_logger::init_with_level(level).unwrap();

    let source = std::fs::read_to_string(&opt.source)?;
    let filename = opt.source.to_string_lossy().to_string();

    let (module, syntax_errors) = homescript::parse(&source, &filename);
    if !syntax_errors.is_empty() {
        for err in &syntax_errors {
            eprintln!("{}", homescript::diagnostic::Diagnostic::from(err).render(&source));
        }
        std::process::exit(1);
    }

    let stack_limit = opt.stack_limit.unwrap_or(homescript::scope::DEFAULT_STACK_LIMIT);
    let mut executor = LiveExecutor::new();
    match homescript::run(
        &module,
        &mut executor,
        IndexMap::new(),
        stack_limit,
        CancelToken::inert(),
    ) {
        Ok((_, code)) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", homescript::diagnostic::Diagnostic::from(&e).render(&source));
            std::process::exit(1);
        }
    }
}
