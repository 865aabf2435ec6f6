//! Homescript: an embeddable scripting language for home-automation rules.
//!
//! This crate implements the lexer-independent evaluator core: lexing, parsing, the
//! value/type system, scope management, the control-flow result protocol, and the
//! host-callout interface an embedding application implements to supply the actual
//! side effects (switches, notifications, HTTP, storage, time).
//!
//! The three entry points a caller needs are [`parse`], [`analyze`], and [`run`].

pub mod ast;
pub mod builtins;
pub mod cancel;
pub mod diagnostic;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod outcome;
pub mod parser;
pub mod scope;
pub mod span;
pub mod unwind;
pub mod value;

mod analyzer;

pub mod test_support;

pub use analyzer::{analyze, AnalysisReport};
pub use ast::Module;
pub use error::Error;
pub use executor::Executor;
pub use value::Value;

/// Lexes and parses `code` into a [`Module`]. Parse errors are collected rather than
/// stopping at the first one: a syntax error causes the parser to recover at
/// the next statement boundary and keep going, so a caller can report every problem in
/// one pass.
pub fn parse(code: &str, filename: &str) -> (Module, Vec<Error>) {
    parser::parse(code, filename)
}

/// Runs a parsed module to completion.
///
/// `scope_additions` are extra root-scope bindings the embedder wants to expose
/// alongside the fixed builtin set — construction fails if any of them would
/// shadow a builtin. `stack_limit` bounds recursion depth; pass
/// [`scope::DEFAULT_STACK_LIMIT`] absent a more specific requirement. `cancel` lets the
/// caller request cooperative termination from another thread;
/// [`cancel::CancelToken::inert`] opts out.
///
/// Returns the value of the last statement and an exit code — 0 unless `exit()` was
/// called or `cancel` fired, in which case the exit code it carried is returned instead.
pub fn run(
    module: &Module,
    executor: &mut dyn Executor,
    scope_additions: indexmap::IndexMap<String, Value>,
    stack_limit: usize,
    cancel: cancel::CancelToken,
) -> Result<(Value, i32), Error> {
    evaluator::run(module, executor, scope_additions, stack_limit, cancel)
}
