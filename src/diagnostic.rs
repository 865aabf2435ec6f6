//! Diagnostics: analyzer-emitted reports with a severity, a message, optional
//! notes, and a span. The evaluator itself never produces these — only `analyze`
//! mode does.

use std::fmt::Write as _;

use crate::span::{LineMap, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Hint,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub notes: Vec<String>,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            notes: Vec::new(),
            span,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Render the diagnostic as ANSI-colored, human-readable text: source line,
    /// an underline under the offending span, severity, kind, filename, line:column,
    /// and message. Multi-line spans print the starting line and "+N more lines".
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        let (color, label) = match self.level {
            Level::Hint => ("\x1b[36m", "hint"),
            Level::Info => ("\x1b[34m", "info"),
            Level::Warning => ("\x1b[33m", "warning"),
            Level::Error => ("\x1b[31m", "error"),
        };
        let reset = "\x1b[0m";

        writeln!(
            out,
            "{color}{label}{reset}: {msg} ({file}:{loc})",
            color = color,
            label = label,
            reset = reset,
            msg = self.message,
            file = self.span.filename,
            loc = self.span.start,
        )
        .unwrap();

        let lines = LineMap::new(source);
        let line_text = lines.line_text(self.span.start.line);
        writeln!(out, "  {}", line_text).unwrap();
        let underline_start = self.span.start.column.saturating_sub(1);
        let underline_len = if self.span.is_multiline() {
            line_text.chars().count().saturating_sub(underline_start)
        } else {
            self.span
                .end
                .column
                .saturating_sub(self.span.start.column)
                .max(1)
        };
        writeln!(
            out,
            "  {}{color}{}{reset}",
            " ".repeat(underline_start),
            "^".repeat(underline_len.max(1)),
            color = color,
            reset = reset,
        )
        .unwrap();

        if self.span.is_multiline() {
            let more = self.span.end.line - self.span.start.line;
            writeln!(out, "  ... +{} more lines", more).unwrap();
        }

        for note in &self.notes {
            writeln!(out, "  note: {}", note).unwrap();
        }

        out
    }
}

impl From<&crate::error::Error> for Diagnostic {
    fn from(err: &crate::error::Error) -> Self {
        let level = match err.kind {
            crate::error::ErrorKind::Info => Level::Info,
            crate::error::ErrorKind::Warning => Level::Warning,
            _ => Level::Error,
        };
        Diagnostic::new(level, err.message.clone(), err.span.clone())
    }
}
