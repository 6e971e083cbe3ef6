// Copyright 2025 The Tari Project
// SPDX-License-Identifier: BSD-3-Clause

//! Request and response value types.
//!
//! [`HttpRequest`] is an immutable description of a single logical request:
//! once built it is never mutated, and a rate-limit retry reissues the same
//! value rather than constructing a new one. [`HttpResponse`] is the plain
//! data handed to callers on success. Neither type holds any transport
//! state; connection handles live only for the duration of one attempt.

use std::time::Duration;

use reqwest::StatusCode;

/// Default application-level timeout applied to requests that do not set
/// their own.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// HTTP methods supported by the request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single text field of a multipart form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The body of a POST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// A raw text payload, sent as-is. Callers set their own `Content-Type`
    /// header alongside it.
    Text(String),
    /// A multipart form; the transport chooses the boundary and the
    /// `Content-Type` header.
    Multipart(Vec<FormField>),
}

/// An immutable description of one logical HTTP request.
///
/// Built with [`HttpRequest::get`] or [`HttpRequest::post`] and refined with
/// the `with_*` builder methods before being handed to
/// [`HttpClient::dispatch`](crate::HttpClient::dispatch). The default
/// timeout is 60 seconds; a zero timeout disables the watchdog entirely so
/// the request runs unsupervised.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use minotari_http::{HttpRequest, RequestBody};
///
/// let request = HttpRequest::post(
///     "https://wallet.example.com/rpc",
///     RequestBody::Text(r#"{"method":"get_balance"}"#.to_string()),
/// )
/// .with_header("Content-Type", "application/json")
/// .with_timeout(Duration::from_secs(30));
///
/// assert_eq!(request.timeout(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    url: String,
    method: HttpMethod,
    body: Option<RequestBody>,
    headers: Vec<(String, String)>,
    timeout: Duration,
}

impl HttpRequest {
    /// Creates a GET request for the given URL with the default timeout.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            body: None,
            headers: Vec::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Creates a POST request carrying the given body with the default
    /// timeout.
    pub fn post(url: impl Into<String>, body: RequestBody) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            body: Some(body),
            headers: Vec::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Appends one header. Headers keep their insertion order and duplicate
    /// names are preserved, not merged.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a batch of headers in order.
    pub fn with_headers(mut self, headers: &[(&str, &str)]) -> Self {
        for (name, value) in headers {
            self.headers.push(((*name).to_string(), (*value).to_string()));
        }
        self
    }

    /// Overrides the application-level timeout for this request.
    ///
    /// A duration of zero disables timeout supervision: no watchdog is
    /// started and the request waits on the transport indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// A completed HTTP response with its body fully read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// Response headers in arrival order; duplicate names are preserved.
    pub headers: Vec<(String, String)>,
    /// The response body decoded as text.
    pub body: String,
}

impl HttpResponse {
    /// Looks up a header by name, case-insensitively. When the header occurs
    /// more than once the first occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Bookkeeping for the most recent logical request a client completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestStats {
    /// Number of transport attempts the request took, counting rate-limit
    /// reissues. A request that succeeds first try reports 1.
    pub attempts: u32,
    /// Wall-clock time from dispatch to the final outcome, including any
    /// rate-limit waits.
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request_defaults() {
        let request = HttpRequest::get("http://localhost:9000/info");
        assert_eq!(request.method(), HttpMethod::Get);
        assert!(request.body().is_none());
        assert!(request.headers().is_empty());
        assert_eq!(request.timeout(), Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn test_post_request_keeps_header_order() {
        let request = HttpRequest::post("http://localhost:9000/rpc", RequestBody::Text("{}".to_string()))
            .with_header("Content-Type", "application/json")
            .with_header("X-Tag", "first")
            .with_header("X-Tag", "second");

        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.headers()[1], ("X-Tag".to_string(), "first".to_string()));
        assert_eq!(request.headers()[2], ("X-Tag".to_string(), "second".to_string()));
    }

    #[test]
    fn test_timeout_override() {
        let request = HttpRequest::get("http://localhost:9000/info").with_timeout(Duration::ZERO);
        assert!(request.timeout().is_zero());
    }

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let response = HttpResponse {
            status: StatusCode::OK,
            headers: vec![
                ("Retry-After".to_string(), "5".to_string()),
                ("retry-after".to_string(), "60".to_string()),
            ],
            body: String::new(),
        };

        assert_eq!(response.header("retry-after"), Some("5"));
        assert_eq!(response.header("RETRY-AFTER"), Some("5"));
        assert_eq!(response.header("content-type"), None);
    }
}
