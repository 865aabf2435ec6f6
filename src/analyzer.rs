//! Static analysis: a second client of the evaluator/value/scope machinery,
//! run in dry-run mode against a host whose [`Executor::is_analyzer`] returns `true`.
//!
//! The analyzer does not reimplement evaluation. It reuses [`crate::evaluator::Evaluator`]
//! wholesale: every builtin already consults `is_analyzer()` to skip real side effects,
//! and the evaluator itself recovers Type/Value errors into diagnostics instead of
//! aborting whenever the host reports analyzer mode, continuing with a Null
//! placeholder so a single pass surfaces as many downstream problems as possible.
//! Heuristics beyond the shared error/diagnostic contract — unused-variable warnings,
//! unreachable-code detection, and the like — are out of scope here: they belong to
//! a layer built on top of this pass, not inside it.

use indexmap::IndexMap;

use crate::ast::Module;
use crate::cancel::CancelToken;
use crate::diagnostic::Diagnostic;
use crate::error::Error;
use crate::evaluator::Evaluator;
use crate::executor::Executor;
use crate::scope::ScopeStack;
use crate::span::Span;
use crate::unwind::Unwind;
use crate::value::Value;

/// Result of [`analyze`]: the parsed module, diagnostics accumulated during the dry
/// run, and any syntax errors the parser could not recover from.
#[derive(Debug)]
pub struct AnalysisReport {
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
    pub syntax_errors: Vec<Error>,
}

impl AnalysisReport {
    /// Whether any diagnostic at [`crate::diagnostic::Level::Error`] (or a syntax error)
    /// was produced — i.e. whether a caller should treat the script as broken rather than
    /// merely noisy.
    pub fn has_errors(&self) -> bool {
        !self.syntax_errors.is_empty()
            || self
                .diagnostics
                .iter()
                .any(|d| d.level == crate::diagnostic::Level::Error)
    }
}

/// Lexes, parses, and dry-runs `code` against `host`. `host.is_analyzer()` must
/// return `true`; builtins and the evaluator both key off it to suppress real effects
/// and turn otherwise-fatal Type/Value errors into diagnostics rather than
/// propagating them.
///
/// Syntax errors (from the parser) stop analysis before the dry run ever starts, since
/// there is no well-formed tree to walk; Reference/StackOverflow/OutOfBounds errors
/// encountered during the dry run are still fatal to it (recovery is only granted to
/// Type/Value) and are reported as a single trailing diagnostic rather than a panic.
pub fn analyze(
    code: &str,
    filename: &str,
    scope_additions: IndexMap<String, Value>,
    host: &mut dyn Executor,
) -> AnalysisReport {
    let (module, syntax_errors) = crate::parser::parse(code, filename);
    if !syntax_errors.is_empty() {
        return AnalysisReport {
            module,
            diagnostics: Vec::new(),
            syntax_errors,
        };
    }

    let builtins = crate::builtins::register();
    let scopes = match ScopeStack::new(builtins, scope_additions, crate::scope::DEFAULT_STACK_LIMIT, Span::dummy()) {
        Ok(s) => s,
        Err(e) => {
            return AnalysisReport {
                module,
                diagnostics: vec![Diagnostic::from(&e)],
                syntax_errors: Vec::new(),
            }
        }
    };

    let mut evaluator = Evaluator::new(scopes, host, CancelToken::inert());
    let result = evaluator.eval_stmt_list(&module.stmts);
    let mut diagnostics = evaluator.take_diagnostics();
    if let Err(Unwind::Error(e)) = result {
        diagnostics.push(Diagnostic::from(&e));
    }
    // Exit codes carry no analysis-time meaning (exit never produces a value);
    // a script that calls exit() during a dry run simply ends its analysis there.

    AnalysisReport {
        module,
        diagnostics,
        syntax_errors: Vec::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support::NullExecutor;

    fn analyzer_host() -> NullExecutor {
        NullExecutor {
            analyzer: true,
            ..Default::default()
        }
    }

    #[test]
    fn syntax_errors_stop_analysis_before_the_dry_run() {
        let mut host = analyzer_host();
        let report = analyze("let = 1;", "<test>", IndexMap::new(), &mut host);
        assert!(!report.syntax_errors.is_empty());
        assert!(report.diagnostics.is_empty());
        assert!(report.has_errors());
    }

    #[test]
    fn type_error_becomes_a_diagnostic_and_analysis_continues() {
        let mut host = analyzer_host();
        let report = analyze(
            r#"let a = [1, 2, 3]; a.push("x"); print("reached");"#,
            "<test>",
            IndexMap::new(),
            &mut host,
        );
        assert!(report.syntax_errors.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].level, crate::diagnostic::Level::Error);
        assert!(host.printed.iter().any(|s| s.contains("reached")));
    }

    #[test]
    fn sleep_is_skipped_entirely_in_analyzer_mode() {
        let mut host = analyzer_host();
        let report = analyze("time.sleep(9999);", "<test>", IndexMap::new(), &mut host);
        assert!(report.syntax_errors.is_empty());
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn well_formed_script_produces_no_diagnostics() {
        let mut host = analyzer_host();
        let report = analyze(
            "fn fact(n) { if n <= 1 { return 1; } return n * fact(n - 1); } fact(5);",
            "<test>",
            IndexMap::new(),
            &mut host,
        );
        assert!(report.syntax_errors.is_empty());
        assert!(report.diagnostics.is_empty());
        assert!(!report.has_errors());
    }
}
