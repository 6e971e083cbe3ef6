// Copyright 2025 The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP client with timeout supervision and rate-limit retry handling.
//!
//! This module provides the asynchronous [`HttpClient`]: every dispatched
//! request is raced against an application-level watchdog timer, `429 Too
//! Many Requests` responses are retried after the server-mandated wait, and
//! every outcome is funnelled into the closed [`HttpError`] taxonomy.
//!
//! # Features
//!
//! - Application-level timeouts enforced by a per-attempt watchdog; a zero
//!   timeout disables supervision entirely
//! - Automatic reissue of rate-limited requests honoring the `Retry-After`
//!   header, unbounded by default and cappable via
//!   [`with_config`](HttpClient::with_config)
//! - Exactly one outcome per logical request, even when a slow response
//!   lands after the watchdog has already fired
//! - Fresh transport handle per attempt; no connection state outlives a
//!   request

use std::time::{Duration, Instant};

use log::{debug, warn};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, multipart};
use tokio::sync::{RwLock, mpsc};
use url::Url;

use crate::error::HttpError;
use crate::types::{DEFAULT_TIMEOUT_MS, HttpMethod, HttpRequest, HttpResponse, RequestBody, RequestStats};
use crate::watchdog::{AttemptOutcome, Watchdog, WatchdogState};

pub(crate) const USER_AGENT: &str = "minotari-http/1.0";
pub(crate) const BODY_READ_FAILED: &str = "Failed to read response body";
const RETRY_AFTER_HEADER: &str = "retry-after";

/// Asynchronous HTTP client for wallet and node endpoints.
///
/// The client holds no connection state of its own; it carries the default
/// timeout applied to convenience calls, the optional cap on rate-limit
/// reissues, and bookkeeping for the most recent request.
pub struct HttpClient {
    timeout: Duration,
    max_retries: Option<u32>,
    last_stats: RwLock<Option<RequestStats>>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with the default configuration: a 60 second timeout
    /// and no cap on rate-limit reissues.
    pub fn new() -> Self {
        Self::with_config(Duration::from_millis(DEFAULT_TIMEOUT_MS), None)
    }

    /// Creates a client with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Default timeout applied by [`get`](Self::get) and
    ///   [`post`](Self::post); zero disables supervision
    /// * `max_retries` - Cap on rate-limit reissues per request; `None`
    ///   retries for as long as the server keeps asking, `Some(0)` disables
    ///   retries entirely
    pub fn with_config(timeout: Duration, max_retries: Option<u32>) -> Self {
        Self {
            timeout,
            max_retries,
            last_stats: RwLock::new(None),
        }
    }

    /// Sends a GET request to the given URL using the client's default
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] when no response could be obtained,
    /// [`HttpError::Timeout`] when the watchdog fired first, and
    /// [`HttpError::Status`] for any response outside `[200, 300)` once the
    /// rate-limit retry logic has run its course.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::get(url).with_timeout(self.timeout);
        self.dispatch(&request).await
    }

    /// Sends a POST request carrying the given body and headers using the
    /// client's default timeout.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the endpoint
    /// * `body` - Raw text or multipart form payload
    /// * `headers` - Header pairs appended in order; duplicates are kept
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use minotari_http::{HttpClient, RequestBody};
    ///
    /// # async fn example() -> Result<(), anyhow::Error> {
    /// let client = HttpClient::new();
    /// let response = client
    ///     .post(
    ///         "https://wallet.example.com/rpc",
    ///         RequestBody::Text(r#"{"method":"get_balance"}"#.to_string()),
    ///         &[("Content-Type", "application/json")],
    ///     )
    ///     .await?;
    /// println!("balance: {}", response.body);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post(
        &self,
        url: &str,
        body: RequestBody,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::post(url, body)
            .with_headers(headers)
            .with_timeout(self.timeout);
        self.dispatch(&request).await
    }

    /// Dispatches a prepared request and returns its single settled outcome.
    ///
    /// The request value is reissued unchanged for every rate-limit retry.
    /// Each attempt is supervised by its own watchdog (unless the request's
    /// timeout is zero) and runs on a fresh transport handle that is
    /// released when the attempt ends.
    ///
    /// # Returns
    ///
    /// The first outcome to settle: the completed [`HttpResponse`] for a
    /// success status, or the [`HttpError`] describing why no success was
    /// delivered. A late transport completion after a timeout is discarded,
    /// never surfaced.
    pub async fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        debug!(method:? = request.method(), url = request.url(); "Dispatching HTTP request");
        let started = Instant::now();
        let (outcome, attempts) = self.run_with_retries(request).await;
        *self.last_stats.write().await = Some(RequestStats {
            attempts,
            elapsed: started.elapsed(),
        });
        outcome
    }

    /// Returns bookkeeping for the most recent request this client
    /// completed, if any.
    pub async fn last_request_stats(&self) -> Option<RequestStats> {
        *self.last_stats.read().await
    }

    /// Runs supervised attempts until one settles with something other than
    /// a retryable rate-limit response. Returns the outcome together with
    /// the number of attempts taken.
    async fn run_with_retries(&self, request: &HttpRequest) -> (AttemptOutcome, u32) {
        let mut attempt: u32 = 1;
        loop {
            let outcome = self.run_attempt(request).await;
            match decide_attempt(outcome, retry_allowed(self.max_retries, attempt)) {
                AttemptDecision::Deliver(outcome) => return (outcome, attempt),
                AttemptDecision::RetryAfter(delay_secs) => {
                    warn!(attempt = attempt, delay_secs = delay_secs; "Rate limited, waiting before retrying");
                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                },
            }
        }
    }

    /// Runs one transport attempt raced against a watchdog.
    ///
    /// The transport call runs on its own task so a fired watchdog never
    /// aborts it; whichever side wins the settle race delivers into the
    /// buffer-of-one outcome channel and the loser's result is dropped.
    async fn run_attempt(&self, request: &HttpRequest) -> AttemptOutcome {
        if request.timeout().is_zero() {
            return run_transport(request).await;
        }

        let (outcome_tx, mut outcome_rx) = mpsc::channel(1);
        let watchdog = Watchdog::spawn(request.timeout(), outcome_tx.clone());

        let attempt_request = request.clone();
        tokio::spawn(async move {
            let outcome = run_transport(&attempt_request).await;
            match watchdog.cancel() {
                WatchdogState::Canceled => {
                    let _ = outcome_tx.try_send(outcome);
                },
                _ => {
                    debug!(
                        url = attempt_request.url();
                        "Transport completed after the watchdog fired, discarding the late outcome"
                    );
                },
            }
        });

        match outcome_rx.recv().await {
            Some(outcome) => outcome,
            // Both senders dropping without a send means the transport task
            // died mid-flight; surface it like any other transport failure.
            None => Err(HttpError::Transport("request task ended without an outcome".to_string())),
        }
    }
}

/// Executes a single HTTP exchange and reads the full response.
///
/// A fresh transport handle is built for every call and dropped on the way
/// out, so no connection state is shared between attempts or requests.
/// Redirects are not followed; a 3xx response is returned as-is for status
/// classification.
async fn run_transport(request: &HttpRequest) -> AttemptOutcome {
    let url = Url::parse(request.url()).map_err(|e| HttpError::Transport(format!("URL parse error: {e}")))?;

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::none())
        .build()
        .map_err(|e| HttpError::Transport(e.to_string()))?;

    let mut builder = match request.method() {
        HttpMethod::Get => client.get(url),
        HttpMethod::Post => client.post(url),
    };
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

    let response = builder.send().await.map_err(|e| HttpError::Transport(e.to_string()))?;

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
    // A success response with an unreadable body is worthless to the caller,
    // so that read failure is a transport error. On an error status the body
    // only annotates the status code and a placeholder will do.
    let body = if status.is_success() {
        response.text().await.map_err(|e| HttpError::Transport(e.to_string()))?
    } else {
        response.text().await.unwrap_or_else(|_| BODY_READ_FAILED.to_string())
    };

    Ok(HttpResponse { status, headers, body })
}

/// What the retry policy wants done with a settled attempt.
pub(crate) enum AttemptDecision {
    /// Deliver this outcome to the caller as the request's single result.
    Deliver(AttemptOutcome),
    /// Wait the given number of seconds, then reissue the same request.
    RetryAfter(u64),
}

/// Applies the rate-limit retry policy to one settled attempt.
///
/// Only a 429 carrying a usable `Retry-After` is retried, and only while
/// the retry budget allows it. Every other outcome is delivered as-is:
/// successes stay successes, other statuses become status errors, and
/// transport or timeout failures are never retried.
pub(crate) fn decide_attempt(outcome: AttemptOutcome, retry_allowed: bool) -> AttemptDecision {
    match outcome {
        Ok(response) if response.status.is_success() => AttemptDecision::Deliver(Ok(response)),
        Ok(response) if response.status == StatusCode::TOO_MANY_REQUESTS => {
            if retry_allowed && let Some(delay_secs) = retry_after_seconds(&response) {
                return AttemptDecision::RetryAfter(delay_secs);
            }
            AttemptDecision::Deliver(Err(HttpError::Status {
                status: response.status,
                body: response.body,
            }))
        },
        Ok(response) => AttemptDecision::Deliver(Err(HttpError::Status {
            status: response.status,
            body: response.body,
        })),
        Err(e) => AttemptDecision::Deliver(Err(e)),
    }
}

/// Whether another reissue fits the retry budget after the given number of
/// completed attempts. `None` means no cap.
pub(crate) fn retry_allowed(max_retries: Option<u32>, completed_attempts: u32) -> bool {
    match max_retries {
        Some(max_retries) => completed_attempts <= max_retries,
        None => true,
    }
}

/// Parses the `Retry-After` header of a rate-limited response.
///
/// Only a strict base-10 integer number of seconds qualifies. A missing
/// header, a zero value, an HTTP-date, or any other form yields `None` so
/// the 429 surfaces as an error instead of a retry. When the header occurs
/// more than once the first occurrence wins.
fn retry_after_seconds(response: &HttpResponse) -> Option<u64> {
    let value = response.header(RETRY_AFTER_HEADER)?.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok().filter(|seconds| *seconds > 0)
}
