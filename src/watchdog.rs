//! Timeout supervision for a single transport attempt.
//!
//! Each supervised attempt gets one [`Watchdog`]: a timer task racing the
//! transport call for the right to settle the attempt's outcome. The race is
//! decided by a single atomic compare-and-swap, so exactly one side delivers
//! and the loser's result is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::HttpError;
use crate::types::HttpResponse;

/// The result of one transport attempt, as raced against the watchdog.
pub(crate) type AttemptOutcome = Result<HttpResponse, HttpError>;

const RUNNING: u8 = 0;
const CANCELED: u8 = 1;
const FIRED: u8 = 2;

/// Lifecycle of a watchdog. `Canceled` and `Fired` are terminal; whichever
/// is reached first decides who settles the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchdogState {
    /// The timer is still pending and the transport call is in flight.
    Running,
    /// The transport call completed first and stopped the timer.
    Canceled,
    /// The timer expired first and delivered a timeout outcome.
    Fired,
}

impl WatchdogState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            CANCELED => WatchdogState::Canceled,
            FIRED => WatchdogState::Fired,
            _ => WatchdogState::Running,
        }
    }
}

/// A one-shot timer tied to a single transport attempt.
///
/// The timer task waits on its own sleep and on a cancellation token. When
/// the sleep wins it attempts the `Running -> Fired` transition and, on
/// success, delivers [`HttpError::Timeout`] into the attempt's outcome
/// channel. When [`cancel`](Watchdog::cancel) wins the transition instead,
/// the token wakes the task immediately and nothing is delivered.
pub(crate) struct Watchdog {
    state: Arc<AtomicU8>,
    token: CancellationToken,
}

impl Watchdog {
    /// Starts the timer task. Must be called before the transport call is
    /// issued so the attempt is supervised from the very beginning.
    pub(crate) fn spawn(timeout: Duration, outcome_tx: mpsc::Sender<AttemptOutcome>) -> Self {
        let state = Arc::new(AtomicU8::new(RUNNING));
        let token = CancellationToken::new();

        let task_state = Arc::clone(&state);
        let task_token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {},
                _ = tokio::time::sleep(timeout) => {
                    if task_state
                        .compare_exchange(RUNNING, FIRED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        // Buffer of one and a won race: the send cannot be
                        // rejected unless the receiver is already gone.
                        let _ = outcome_tx.try_send(Err(HttpError::Timeout));
                    }
                },
            }
        });

        Self { state, token }
    }

    /// Stops the timer from the completion path.
    ///
    /// Returns the terminal state: [`WatchdogState::Canceled`] when this call
    /// won the race and the caller owns outcome delivery, or
    /// [`WatchdogState::Fired`] when the timer already delivered a timeout
    /// and the caller must discard its outcome. Calling this more than once
    /// is harmless; later calls observe the terminal state without changing
    /// it.
    pub(crate) fn cancel(&self) -> WatchdogState {
        match self
            .state
            .compare_exchange(RUNNING, CANCELED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.token.cancel();
                WatchdogState::Canceled
            },
            Err(previous) => WatchdogState::from_raw(previous),
        }
    }

    #[cfg(test)]
    fn state(&self) -> WatchdogState {
        WatchdogState::from_raw(self.state.load(Ordering::Acquire))
    }
}
