//! The error half of evaluator propagation.
//!
//! [`crate::outcome::Outcome`] carries ordinary break/continue/return signals within a
//! single script. `Unwind` sits one level above it: it is the `Err` side of every
//! evaluator function's `Result`, and distinguishes an ordinary fatal [`Error`] from a
//! whole-program exit (triggered by the `exit()` builtin or by a termination signal
//! observed on the cancellation channel). Both cases unwind every enclosing scope
//! frame deterministically; they differ only in how `run` reports them afterward —
//! an `Error` becomes `Err(error)`, an `Exit` becomes `Ok((value_so_far, code))`.

use crate::error::Error;

#[derive(Debug, Clone)]
pub enum Unwind {
    Error(Error),
    Exit(i32),
}

impl From<Error> for Unwind {
    fn from(err: Error) -> Self {
        Unwind::Error(err)
    }
}

pub type EvalResult<T> = Result<T, Unwind>;
