//! The error model: a closed kind enum plus a uniform `{kind, message, span}`
//! shape shared by runtime errors and, via [`crate::diagnostic::Diagnostic`], by
//! analyzer warnings and hints.

use std::fmt;

use snafu::Snafu;

use crate::span::Span;

/// Closed enum of error categories.
///
/// `Info` and `Warning` are never constructed by the evaluator; they only ever
/// travel as [`crate::diagnostic::Diagnostic`]s produced by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Type,
    Runtime,
    Value,
    Throw,
    StackOverflow,
    Reference,
    OutOfBounds,
    Info,
    Warning,
}

impl ErrorKind {
    /// Whether this kind is catchable by a Homescript `try`/`catch` block.
    pub fn is_catchable(self) -> bool {
        matches!(self, ErrorKind::Runtime | ErrorKind::Throw)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Type => "type error",
            ErrorKind::Runtime => "runtime error",
            ErrorKind::Value => "value error",
            ErrorKind::Throw => "uncaught throw",
            ErrorKind::StackOverflow => "stack overflow",
            ErrorKind::Reference => "reference error",
            ErrorKind::OutOfBounds => "out of bounds",
            ErrorKind::Info => "info",
            ErrorKind::Warning => "warning",
        };
        write!(f, "{}", s)
    }
}

/// A typed failure with a source location, as produced by the lexer, parser, evaluator
/// and analyzer alike.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(display("{kind}: {message} ({span})"))]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Syntax, message, span)
    }

    pub fn type_error(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Type, message, span)
    }

    pub fn runtime(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Runtime, message, span)
    }

    pub fn value(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Value, message, span)
    }

    pub fn throw(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Throw, message, span)
    }

    pub fn stack_overflow(span: Span) -> Self {
        Self::new(ErrorKind::StackOverflow, "stack overflow", span)
    }

    pub fn reference(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Reference, message, span)
    }

    pub fn out_of_bounds(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::OutOfBounds, message, span)
    }

    /// Ordinal helper used by builtin argument checking: "the first argument",
    /// "the second argument", etc.
    pub fn bad_argument(ordinal: usize, expected: &str, span: Span) -> Self {
        let name = ordinal_name(ordinal);
        Self::type_error(format!("{} argument must be {}", name, expected), span)
    }
}

fn ordinal_name(n: usize) -> &'static str {
    match n {
        1 => "first",
        2 => "second",
        3 => "third",
        4 => "fourth",
        5 => "fifth",
        6 => "sixth",
        7 => "seventh",
        8 => "eighth",
        9 => "ninth",
        10 => "tenth",
        _ => "an",
    }
}

pub type HomescriptResult<T> = Result<T, Error>;
