//! Backing builtin for `import` statements. Module resolution
//! is host-specific and not otherwise specified here.
//!
//! `import name (as alias)? from id` binds a zero-argument stub function under the
//! local name. The stub's body is a single call to this hidden builtin with `id` baked
//! in as a literal string argument — not closed-over Rust state, so the no-closed-over-
//! state invariant on `BuiltinFn` still holds; the "what to resolve" state lives
//! in the synthesized AST, built by `Evaluator::eval_import` (`src/evaluator.rs`).

use indexmap::IndexMap;

use crate::error::Error;
use crate::executor::Executor;
use crate::span::Span;
use crate::value::{BuiltinReturn, Value};

pub const RESOLVE_NAME: &str = "__resolve_module";

pub fn register(map: &mut IndexMap<String, Value>) {
    map.insert(RESOLVE_NAME.to_string(), Value::builtin_function(RESOLVE_NAME, resolve));
}

fn resolve(ex: &mut dyn Executor, span: &Span, args: Vec<Value>) -> Result<BuiltinReturn, Error> {
    let id = crate::builtins::args::as_string(&args, 0, span)?;
    let module = ex
        .resolve_module(id)
        .map_err(|e| Error::runtime(e.message, span.clone()))?;
    if !module.found || !module.usable {
        return Err(Error::runtime(
            format!("cannot execute unresolved import `{}`", id),
            span.clone(),
        ));
    }
    // Executing a resolved foreign module's code is out of scope here (explicitly
    // no cycle detection, no cross-module execution pipeline); a successful
    // resolution simply yields no value.
    Ok(BuiltinReturn::Value(Value::null(span.clone())))
}
