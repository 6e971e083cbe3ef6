//! Synchronous POST facade for callers without an async runtime.
//!
//! [`BlockingHttpClient`] applies the same rate-limit retry policy as the
//! asynchronous client but blocks the calling thread: the transport call
//! runs synchronously and `Retry-After` waits are plain thread sleeps.
//! There is no timeout supervision on this path.
//!
//! Must not be used from inside an async runtime; from async code call
//! [`HttpClient`](crate::HttpClient) instead, or wrap this client in
//! `tokio::task::spawn_blocking`.

use std::sync::RwLock;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use reqwest::blocking::{Client, multipart};
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

use crate::client::{AttemptDecision, BODY_READ_FAILED, USER_AGENT, decide_attempt, retry_allowed};
use crate::error::HttpError;
use crate::types::{HttpMethod, HttpRequest, HttpResponse, RequestBody, RequestStats};

/// Synchronous HTTP client. POST only.
pub struct BlockingHttpClient {
    max_retries: Option<u32>,
    last_stats: RwLock<Option<RequestStats>>,
}

impl Default for BlockingHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockingHttpClient {
    /// Creates a client with no cap on rate-limit reissues.
    pub fn new() -> Self {
        Self::with_config(None)
    }

    /// Creates a client with a cap on rate-limit reissues per request.
    /// `Some(0)` disables retries entirely.
    pub fn with_config(max_retries: Option<u32>) -> Self {
        Self {
            max_retries,
            last_stats: RwLock::new(None),
        }
    }

    /// Sends a POST request, blocking until its outcome settles.
    ///
    /// Rate-limited responses with a usable `Retry-After` put the calling
    /// thread to sleep for the server-mandated wait before the request is
    /// reissued unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] when no response could be obtained
    /// and [`HttpError::Status`] for any response outside `[200, 300)`.
    /// [`HttpError::Timeout`] is never produced on this path.
    pub fn post(
        &self,
        url: &str,
        body: RequestBody,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::post(url, body).with_headers(headers);
        debug!(url = request.url(); "Dispatching blocking HTTP request");
        let started = Instant::now();
        let (outcome, attempts) = self.run_with_retries(&request);
        if let Ok(mut stats) = self.last_stats.write() {
            *stats = Some(RequestStats {
                attempts,
                elapsed: started.elapsed(),
            });
        }
        outcome
    }

    /// Sends a POST request and decodes the response body as JSON of any
    /// shape.
    ///
    /// # Errors
    ///
    /// In addition to the [`post`](Self::post) errors, returns
    /// [`HttpError::Status`] carrying the original status and body when the
    /// body is not valid JSON.
    pub fn post_json(
        &self,
        url: &str,
        body: RequestBody,
        headers: &[(&str, &str)],
    ) -> Result<Value, HttpError> {
        let response = self.post(url, body, headers)?;
        match serde_json::from_str(&response.body) {
            Ok(value) => Ok(value),
            Err(_) => Err(HttpError::Status {
                status: response.status,
                body: response.body,
            }),
        }
    }

    /// Returns bookkeeping for the most recent request this client
    /// completed, if any.
    pub fn last_request_stats(&self) -> Option<RequestStats> {
        self.last_stats.read().ok().and_then(|stats| *stats)
    }

    fn run_with_retries(&self, request: &HttpRequest) -> (Result<HttpResponse, HttpError>, u32) {
        let mut attempt: u32 = 1;
        loop {
            let outcome = run_transport(request);
            match decide_attempt(outcome, retry_allowed(self.max_retries, attempt)) {
                AttemptDecision::Deliver(outcome) => return (outcome, attempt),
                AttemptDecision::RetryAfter(delay_secs) => {
                    warn!(attempt = attempt, delay_secs = delay_secs; "Rate limited, waiting before retrying");
                    thread::sleep(Duration::from_secs(delay_secs));
                    attempt += 1;
                },
            }
        }
    }
}

/// Synchronous counterpart of the async transport step: fresh handle per
/// attempt, no redirect following, full body read before returning.
fn run_transport(request: &HttpRequest) -> Result<HttpResponse, HttpError> {
    let url = Url::parse(request.url()).map_err(|e| HttpError::Transport(format!("URL parse error: {e}")))?;

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::none())
        .build()
        .map_err(|e| HttpError::Transport(e.to_string()))?;

    debug_assert_eq!(request.method(), HttpMethod::Post);
    let mut builder = client.post(url);
    for (name, value) in request.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    match request.body() {
        Some(RequestBody::Text(text)) => {
            builder = builder.body(text.clone());
        },
        Some(RequestBody::Multipart(fields)) => {
            let mut form = multipart::Form::new();
            for field in fields {
                form = form.text(field.name.clone(), field.value.clone());
            }
            builder = builder.multipart(form);
        },
        None => {},
    }

    let response = builder.send().map_err(|e| HttpError::Transport(e.to_string()))?;

    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = if status.is_success() {
        response.text().map_err(|e| HttpError::Transport(e.to_string()))?
    } else {
        response.text().unwrap_or_else(|_| BODY_READ_FAILED.to_string())
    };

    Ok(HttpResponse { status, headers, body })
}
