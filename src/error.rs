//! Error types for API calls.
//!
//! Every failure a logical call can end with is one variant of [`Error`]. The
//! variants follow the classification the retry policy works with: transport
//! failures are retryable, everything else is terminal unless a custom
//! [`RetryPredicate`](crate::RetryPredicate) says otherwise.
//!
//! URLs and messages stored in an error never contain the API credentials;
//! they are scrubbed before the error is constructed.

use crate::transport::TransportError;
use http::StatusCode;

/// The main error type for API calls.
///
/// # Examples
///
/// ```no_run
/// use gizmo_client::{Client, Error, PageRequest};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .credentials("token", "secret")
///     .build()?;
///
/// match client.get_responses(42, PageRequest::All).await {
///     Ok(responses) => println!("{} responses", responses.len()),
///     Err(Error::Api { url, page }) => {
///         eprintln!("API refused {} (page {:?})", url, page);
///     }
///     Err(Error::MaxRetriesExceeded { attempts, last_error }) => {
///         eprintln!("Gave up after {} attempts: {}", attempts, last_error);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The remote endpoint could not be reached, or answered with a non-2xx
    /// status.
    ///
    /// This is the only kind retried by the default retry predicate.
    #[error("Transport error for {url}: {source}")]
    Transport {
        /// The attempted URL, credentials redacted
        url: String,
        /// What the transport reported
        #[source]
        source: TransportError,
    },

    /// The service answered at the transport layer but declared
    /// `result_ok = false`, or returned no payload where one was expected.
    #[error("API reported failure for {url}")]
    Api {
        /// The offending URL, credentials redacted
        url: String,
        /// The page being fetched, for paged calls
        page: Option<u32>,
    },

    /// The response body did not match the expected envelope shape.
    ///
    /// Preserves the raw body and the serde error message for debugging.
    #[error("Failed to deserialize response from {url}: {serde_error}")]
    DeserializationFailed {
        /// The requested URL, credentials redacted
        url: String,
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
    },

    /// The retry budget for one page fetch was used up.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// The number of attempts made
        attempts: usize,
        /// The last error encountered
        last_error: Box<Error>,
    },

    /// Invalid configuration was provided to the client builder.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid base URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this error is transport-classified and therefore
    /// retryable under the default policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use gizmo_client::{Error, TransportError};
    /// use http::StatusCode;
    ///
    /// let err = Error::Transport {
    ///     url: "survey?api_token=***".to_string(),
    ///     source: TransportError::status(StatusCode::BAD_GATEWAY, "upstream down"),
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::Api { url: "survey".to_string(), page: Some(3) };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { .. } => true,
            Error::Api { .. } => false,
            Error::DeserializationFailed { .. } => false,
            Error::MaxRetriesExceeded { .. } => false,
            Error::ConfigurationError(_) => false,
            Error::InvalidUrl(_) => false,
        }
    }

    /// Returns the HTTP status code if the transport reported one.
    ///
    /// For `MaxRetriesExceeded` this looks at the last error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Transport { source, .. } => source.status_code(),
            Error::MaxRetriesExceeded { last_error, .. } => last_error.status(),
            _ => None,
        }
    }

    /// Returns the redacted URL this error is about, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Transport { url, .. }
            | Error::Api { url, .. }
            | Error::DeserializationFailed { url, .. } => Some(url),
            Error::MaxRetriesExceeded { last_error, .. } => last_error.url(),
            Error::ConfigurationError(_) | Error::InvalidUrl(_) => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            Error::Transport { source, .. } => source.body(),
            _ => None,
        }
    }

    /// Returns rate limit information if the transport parsed any.
    pub fn rate_limit_info(&self) -> Option<&crate::rate_limit::RateLimitInfo> {
        match self {
            Error::Transport { source, .. } => source.rate_limit_info(),
            _ => None,
        }
    }

    /// Returns the recommended delay from rate limit information, capped by
    /// `max_wait`.
    pub fn rate_limit_delay(&self, max_wait: std::time::Duration) -> Option<std::time::Duration> {
        self.rate_limit_info()?.delay(max_wait)
    }
}

/// A specialized `Result` type for API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_errors_are_retryable() {
        let transport = Error::Transport {
            url: "survey".to_string(),
            source: TransportError::network("connection reset"),
        };
        let api = Error::Api {
            url: "survey".to_string(),
            page: None,
        };
        let deser = Error::DeserializationFailed {
            url: "survey".to_string(),
            raw_response: "<html>".to_string(),
            serde_error: "expected value".to_string(),
        };

        assert!(transport.is_retryable());
        assert!(!api.is_retryable());
        assert!(!deser.is_retryable());
    }

    #[test]
    fn test_exhaustion_exposes_last_error_context() {
        let err = Error::MaxRetriesExceeded {
            attempts: 10,
            last_error: Box::new(Error::Transport {
                url: "survey/1?api_token=***".to_string(),
                source: TransportError::status(StatusCode::SERVICE_UNAVAILABLE, "busy"),
            }),
        };

        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(err.url(), Some("survey/1?api_token=***"));
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("10 attempts"));
    }
}
