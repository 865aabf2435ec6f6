//! Cooperative cancellation.
//!
//! The source polls a global send/receive channel ad hoc (Design Notes). Here
//! cancellation is an explicit token threaded through `run` and the evaluator, wrapping
//! a non-blocking `mpsc` receiver. The evaluator polls it at every statement boundary
//! (`Evaluator::poll_cancel`); builtins that block for any length of time (`sleep`,
//! HTTP) must poll it too, subdividing long waits into slices no longer than
//! [`SLEEP_SLICE`].

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

/// Long-running builtins must not block longer than this between cancellation checks.
pub const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// The host-facing handle: send an exit code down this to request termination.
pub type CancelSender = Sender<i32>;

/// The evaluator-facing handle: non-blocking poll for a pending termination signal.
pub struct CancelToken {
    rx: Receiver<i32>,
    /// Once a signal has been observed, remember it — `try_recv` only yields a value
    /// once, but the evaluator may poll long after the signal first arrived.
    observed: Option<i32>,
}

impl CancelToken {
    pub fn new() -> (CancelSender, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            CancelToken {
                rx,
                observed: None,
            },
        )
    }

    /// A token that never cancels, for embedders that don't need termination signals.
    pub fn inert() -> Self {
        let (_tx, rx) = mpsc::channel();
        CancelToken { rx, observed: None }
    }

    /// Non-blocking check for a pending termination signal. Returns the exit code to
    /// unwind with, if any.
    pub fn poll(&mut self) -> Option<i32> {
        if let Some(code) = self.observed {
            return Some(code);
        }
        match self.rx.try_recv() {
            Ok(code) => {
                self.observed = Some(code);
                Some(code)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Sleep for `duration`, subdividing into [`SLEEP_SLICE`] pieces and polling for
    /// cancellation between each. Returns the exit code if cancellation interrupted
    /// the sleep before it completed.
    pub fn sleep(&mut self, duration: Duration) -> Option<i32> {
        let mut remaining = duration;
        while remaining > Duration::ZERO {
            if let Some(code) = self.poll() {
                return Some(code);
            }
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining -= slice;
        }
        self.poll()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn poll_is_none_until_a_signal_is_sent() {
        let (tx, mut token) = CancelToken::new();
        assert_eq!(token.poll(), None);
        tx.send(7).unwrap();
        assert_eq!(token.poll(), Some(7));
        // remains observed on subsequent polls
        assert_eq!(token.poll(), Some(7));
    }

    #[test]
    fn inert_token_never_cancels() {
        let mut token = CancelToken::inert();
        assert_eq!(token.poll(), None);
    }
}
