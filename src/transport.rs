//! The transport port: one rate-limited GET per call, returning the raw body.
//!
//! The engine never talks to the network itself. It hands fully built URLs to
//! a [`Transport`] and interprets the body it gets back. [`HttpTransport`] is
//! the reqwest-backed implementation used by default; tests plug in their
//! own.

use crate::rate_limit::{RateLimitInfo, Throttle};
use crate::{Error, Result};
use async_trait::async_trait;
use http::header::ACCEPT;
use http::StatusCode;
use std::time::Duration;

/// A failure reaching the remote endpoint.
///
/// Transport errors never include the request URL; the client attaches a
/// redacted copy when it wraps them into [`Error::Transport`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum TransportError {
    /// Connection, DNS, TLS or body read failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("HTTP error {status}: {body}")]
    Status {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        body: String,
        /// Rate limit headers, when the response carried an active limit
        rate_limit_info: Option<RateLimitInfo>,
    },
}

impl TransportError {
    /// A network-level failure with the given description.
    pub fn network(message: impl Into<String>) -> Self {
        TransportError::Network(message.into())
    }

    /// A protocol-level failure with the given status and body.
    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        TransportError::Status {
            status,
            body: body.into(),
            rate_limit_info: None,
        }
    }

    /// The HTTP status code, for protocol-level failures.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The response body, for protocol-level failures.
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Rate limit information, for protocol-level failures that carried it.
    pub fn rate_limit_info(&self) -> Option<&RateLimitInfo> {
        match self {
            TransportError::Status {
                rate_limit_info, ..
            } => rate_limit_info.as_ref(),
            _ => None,
        }
    }

    /// Applies `scrub` to every free-text part of the error.
    pub(crate) fn map_text(self, scrub: impl Fn(&str) -> String) -> Self {
        match self {
            TransportError::Network(message) => TransportError::Network(scrub(&message)),
            TransportError::Timeout => TransportError::Timeout,
            TransportError::Status {
                status,
                body,
                rate_limit_info,
            } => TransportError::Status {
                status,
                body: scrub(&body),
                rate_limit_info,
            },
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            // reqwest puts the full URL, credentials included, into Display.
            TransportError::Network(e.without_url().to_string())
        }
    }
}

/// Performs one GET against a fully built URL and returns the response body.
///
/// Implementations do their own rate limiting and must classify every
/// failure as a [`TransportError`]. They must not log `url`, it carries the
/// API credentials.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns the body of a 2xx response.
    async fn fetch(&self, url: &str) -> std::result::Result<String, TransportError>;
}

/// The default [`Transport`], backed by a pooled `reqwest::Client`.
///
/// Requests are spaced at least `min_interval` apart across all calls made
/// through the same transport.
#[derive(Debug)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    timeout: Option<Duration>,
    throttle: Throttle,
}

impl HttpTransport {
    /// Default spacing between requests: the service allows 240 calls a minute.
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

    /// Creates a transport with the given per-request timeout and spacing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the underlying HTTP client cannot be
    /// built.
    pub fn new(timeout: Option<Duration>, min_interval: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            http_client,
            timeout,
            throttle: Throttle::new(min_interval),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> std::result::Result<String, TransportError> {
        self.throttle.acquire().await;

        let mut request = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/json");
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let rate_limit_info = RateLimitInfo::from_headers(response.headers());
            let body = response.text().await.unwrap_or_default();

            // The body may echo credentials; the client logs it once scrubbed.
            if status.is_client_error() {
                tracing::error!(status = status.as_u16(), "Client error (4xx)");
            } else {
                tracing::warn!(status = status.as_u16(), "Server error");
            }

            return Err(TransportError::Status {
                status,
                body,
                rate_limit_info,
            });
        }

        Ok(response.text().await?)
    }
}
