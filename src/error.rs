//! Error types for supervised HTTP requests.
//!
//! This module defines the [`HttpError`] enum which encompasses all possible
//! failure modes of a dispatched request. The enum is deliberately closed:
//! every internal failure (connection problems, watchdog expiry, unexpected
//! status codes, undecodable bodies) is converted into one of its three
//! variants before it reaches the caller, so callers can match exhaustively.
//!
//! # Error Categories
//!
//! - **Transport errors**: [`Transport`](HttpError::Transport), produced when
//!   the request never yields a usable response (connection refused, DNS
//!   failure, TLS error, malformed URL, interrupted body read on a success
//!   response).
//! - **Timeouts**: [`Timeout`](HttpError::Timeout), produced when the
//!   application-level watchdog expires before the transport completes.
//! - **Server errors**: [`Status`](HttpError::Status), produced from a
//!   completed exchange: a non-2xx status code, or a 2xx body that could not
//!   be decoded into the requested JSON shape.
//!
//! # Example
//!
//! ```rust,no_run
//! use minotari_http::HttpError;
//!
//! fn handle_error(err: HttpError) {
//!     match err {
//!         HttpError::Status { status, body } => {
//!             eprintln!("Server returned {}: {}", status, body);
//!         }
//!         HttpError::Timeout => {
//!             eprintln!("Request timed out");
//!         }
//!         HttpError::Transport(msg) => {
//!             eprintln!("Network error: {}", msg);
//!         }
//!     }
//! }
//! ```

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while dispatching an HTTP request.
///
/// Exactly one of these is delivered per logical request that does not
/// succeed. `Transport` and `Timeout` carry no status code; `Status` is the
/// only variant produced from a completed HTTP exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    /// The request failed before a response could be classified.
    ///
    /// This covers connectivity issues (connection refused, DNS resolution
    /// failure, TLS handshake errors) as well as anything that goes wrong
    /// while assembling the request: an unparseable URL, a transport handle
    /// that could not be built, or a body read that failed on a success
    /// response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The watchdog expired before the transport call completed.
    ///
    /// The in-flight transport call is not aborted by the watchdog; if it
    /// completes later its outcome is discarded, so this remains the single
    /// outcome the caller observes.
    #[error("operation timed out")]
    Timeout,

    /// The server returned a response that cannot be delivered as a success.
    ///
    /// Contains both the HTTP status code and the raw response body. This is
    /// produced for any status outside `[200, 300)` (after the rate-limit
    /// retry logic has run its course for 429), and also for a 2xx response
    /// whose body did not decode into the JSON shape the caller asked for,
    /// in which case `status` is the original success code.
    #[error("Server error {status}: {body}")]
    Status {
        /// The HTTP status code returned by the server.
        status: StatusCode,
        /// The raw response body, which may contain error details.
        body: String,
    },
}

impl HttpError {
    /// Returns the HTTP status code, present only for status-classified
    /// errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when this error was produced by the watchdog.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout)
    }
}
