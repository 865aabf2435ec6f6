//! The control-flow result protocol.
//!
//! A naive four-field result struct (`{ value, break_value, return_value,
//! should_continue }`) carries the invariant that at most one of the three signal
//! fields is set at a time. That invariant is exactly what a tagged union expresses
//! directly, so it is collapsed here into `Outcome`. Every evaluator function returns
//! `Result<Outcome, Unwind>` (see [`crate::unwind::Unwind`] for the error/exit half).

use crate::value::Value;

/// The result of evaluating one AST node.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// An ordinary expression result; no break/continue/return is in flight.
    Value(Value),
    /// `break value?` is propagating outward, looking for its enclosing loop.
    Break(Value),
    /// `continue` is propagating outward, looking for its enclosing loop.
    Continue,
    /// `return value?` is propagating outward, looking for its enclosing function.
    Return(Value),
}

impl Outcome {
    /// True if this is a plain value with no break/continue/return in flight.
    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    /// Unwrap a plain value, or hand back the ambient `null` for `Continue` (which
    /// carries none). Used where a caller has already confirmed no break/return
    /// should apply at this point, e.g. sequencing statements in a block.
    pub fn into_value(self, null: impl FnOnce() -> Value) -> Value {
        match self {
            Outcome::Value(v) | Outcome::Break(v) | Outcome::Return(v) => v,
            Outcome::Continue => null(),
        }
    }
}
