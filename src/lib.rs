//! Supervised HTTP request layer for wallet and node tooling.
//!
//! This crate provides small, self-contained HTTP clients for talking to
//! wallet daemons and base node endpoints: an asynchronous [`HttpClient`]
//! and a synchronous [`BlockingHttpClient`]. Every request gets exactly one
//! outcome, timeouts are enforced at the application level, and server rate
//! limiting is handled transparently.
//!
//! # Architecture
//!
//! - [`HttpClient`]: async dispatcher; races each transport attempt against
//!   a watchdog timer and reissues rate-limited requests
//! - [`BlockingHttpClient`]: synchronous POST facade with the same retry
//!   policy and no timeout supervision
//! - [`HttpRequest`] / [`HttpResponse`]: immutable request description and
//!   plain response data
//! - [`HttpError`]: closed error taxonomy; transport failures, timeouts and
//!   status failures are the only shapes callers ever see
//!
//! # Features
//!
//! - Application-level timeout per request (default 60 seconds, zero
//!   disables supervision); a timed-out transport call is never aborted,
//!   its late result is discarded
//! - `429 Too Many Requests` handling driven by the `Retry-After` header,
//!   unbounded by default with an optional retry cap
//! - JSON helpers decoding into objects, arrays or any deserializable type
//!   while preserving the offending status and body on mismatch
//! - No shared connection state: each attempt runs on a fresh transport
//!   handle
//!
//! # Example
//!
//! ```rust,no_run
//! use minotari_http::{HttpClient, HttpError};
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let client = HttpClient::new();
//!
//! match client.get_json_object("https://node.example.com/info").await {
//!     Ok(info) => println!("tip height: {:?}", info.get("height")),
//!     Err(HttpError::Timeout) => eprintln!("node did not answer in time"),
//!     Err(HttpError::Status { status, body }) => eprintln!("node returned {status}: {body}"),
//!     Err(HttpError::Transport(msg)) => eprintln!("network problem: {msg}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`HttpError`]. The variants are closed and
//! exhaustive: anything that goes wrong while assembling or sending a
//! request is a [`Transport`](HttpError::Transport) error, a watchdog
//! expiry is [`Timeout`](HttpError::Timeout), and a completed exchange that
//! cannot be delivered as a success (non-2xx status, or a 2xx body of the
//! wrong JSON shape) is [`Status`](HttpError::Status).

mod blocking;
mod client;
mod error;
mod json;
mod types;
mod watchdog;

pub use blocking::BlockingHttpClient;
pub use client::HttpClient;
pub use error::HttpError;
pub use types::{FormField, HttpMethod, HttpRequest, HttpResponse, RequestBody, RequestStats};
