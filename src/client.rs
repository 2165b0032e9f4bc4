//! The API client and its builder.
//!
//! [`Client`] holds the process-wide configuration of a connection to the
//! API: base URL, credentials, page size, transport and retry policy. The
//! request engine itself lives in the `pagination` module; entity-level
//! methods live in `api`.

use crate::credentials::Credentials;
use crate::envelope::{EnvelopeError, Page, Shape};
use crate::query::{Endpoint, Param};
use crate::rate_limit::RateLimitConfig;
use crate::retry::{Backoff, RetryOnTransport, RetryPolicy, RetryPredicate};
use crate::transport::{HttpTransport, Transport};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Base URL of the v4 REST API.
pub const DEFAULT_BASE_URL: &str = "https://restapi.surveygizmo.com/v4/";

/// A client for the survey REST API.
///
/// Cheap to clone; clones share the transport and its throttle.
///
/// # Examples
///
/// ```no_run
/// use gizmo_client::{Backoff, Client, PageRequest};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), gizmo_client::Error> {
/// let client = Client::builder()
///     .credentials("my-token", "my-secret")
///     .batch_size(200)
///     .backoff(Backoff::Exponential {
///         initial_delay: Duration::from_millis(250),
///         max_delay: Duration::from_secs(10),
///         jitter: true,
///     })
///     .build()?;
///
/// let surveys = client.get_all_surveys(PageRequest::All).await?;
/// println!("{} surveys", surveys.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: Url,
    credentials: Credentials,
    batch_size: Option<u32>,
    transport: Arc<dyn Transport>,
    retry_policy: RetryPolicy,
}

/// A request URL together with its credential-free twin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestUrl {
    pub(crate) full: String,
    pub(crate) redacted: String,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The base URL every endpoint path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The configured page size, if any.
    pub fn batch_size(&self) -> Option<u32> {
        self.inner.batch_size
    }

    pub(crate) fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry_policy
    }

    /// Builds the URL for `endpoint`; `page` is set for paged calls only.
    ///
    /// Parameter order: endpoint parameters, credentials, page size, page.
    pub(crate) fn request_url(&self, endpoint: &Endpoint, page: Option<u32>) -> RequestUrl {
        let mut paging = Vec::new();
        if let Some(page) = page {
            if let Some(size) = self.inner.batch_size.filter(|size| *size > 0) {
                paging.push(Param::optional("resultsperpage", Some(size.to_string())));
            }
            paging.push(Param::optional("page", Some(page.to_string())));
        }

        let render = |credentials: [Param; 2]| {
            let trailing: Vec<Param> = credentials
                .into_iter()
                .chain(paging.iter().cloned())
                .collect();
            format!("{}{}", self.inner.base_url, endpoint.render(&trailing))
        };

        RequestUrl {
            full: render(self.inner.credentials.params()),
            redacted: render(Credentials::masked_params()),
        }
    }

    /// One attempt: fetch `url` and unwrap the body as `shape`.
    pub(crate) async fn fetch_page<T>(
        &self,
        url: &RequestUrl,
        shape: Shape,
        page: Option<u32>,
        attempt: usize,
    ) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(
            url = %url.redacted,
            page = ?page,
            attempt = attempt,
            "Executing API request"
        );

        let credentials = &self.inner.credentials;
        let body = self
            .inner
            .transport
            .fetch(&url.full)
            .await
            .map_err(|source| Error::Transport {
                url: url.redacted.clone(),
                source: source.map_text(|text| credentials.scrub(text)),
            })?;

        shape.unwrap::<T>(&body).map_err(|e| match e {
            EnvelopeError::Malformed(serde_error) => {
                // serde_json quotes offending values, which may be echoed credentials.
                let serde_error = credentials.scrub(&serde_error.to_string());
                let raw_response = credentials.scrub(&body);
                tracing::error!(
                    error = %serde_error,
                    url = %url.redacted,
                    raw_response = %raw_response,
                    "Failed to deserialize response"
                );
                Error::DeserializationFailed {
                    url: url.redacted.clone(),
                    raw_response,
                    serde_error,
                }
            }
            EnvelopeError::Declined => Error::Api {
                url: url.redacted.clone(),
                page,
            },
        })
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Only the credentials are mandatory.
///
/// # Examples
///
/// ```no_run
/// use gizmo_client::{rate_limit::RateLimitConfig, ClientBuilder};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), gizmo_client::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://restapi.surveygizmo.eu/v4")?
///     .credentials("my-token", "my-secret")
///     .timeout(Duration::from_secs(30))
///     .min_request_interval(Duration::from_millis(500))
///     .rate_limit_config(RateLimitConfig::with_max_wait(Duration::from_secs(60)))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    credentials: Option<Credentials>,
    batch_size: Option<u32>,
    transport: Option<Arc<dyn Transport>>,
    backoff: Backoff,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    rate_limit_config: RateLimitConfig,
    timeout: Option<Duration>,
    min_request_interval: Duration,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: None,
            batch_size: None,
            transport: None,
            backoff: Backoff::None,
            retry_predicate: None,
            rate_limit_config: RateLimitConfig::default(),
            timeout: None,
            min_request_interval: HttpTransport::DEFAULT_MIN_INTERVAL,
        }
    }

    /// Sets the base URL. Defaults to [`DEFAULT_BASE_URL`].
    ///
    /// A trailing slash is added if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let mut url = Url::parse(url.as_ref())?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Sets the API token and secret sent with every request.
    pub fn credentials(mut self, token: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(token, secret));
        self
    }

    /// Sets the page size requested from paged endpoints (`resultsperpage`).
    ///
    /// Zero means the server default.
    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Replaces the default HTTP transport.
    ///
    /// `timeout` and `min_request_interval` are ignored when a transport is
    /// supplied.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the delay between retries. Defaults to retrying immediately.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default only transport errors are retried.
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Sets how server-indicated rate limit waits are honored.
    pub fn rate_limit_config(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit_config = config;
        self
    }

    /// Sets the per-request timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the minimum spacing between requests of the default transport.
    pub fn min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the credentials are missing or empty,
    /// or if the default transport cannot be created.
    pub fn build(self) -> Result<Client> {
        let credentials = self
            .credentials
            .filter(|credentials| !credentials.is_incomplete())
            .ok_or_else(|| {
                Error::ConfigurationError("API token and secret are required".to_string())
            })?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(
                self.timeout,
                self.min_request_interval,
            )?),
        };

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryOnTransport));

        Ok(Client {
            inner: Arc::new(ClientInner {
                base_url,
                credentials,
                batch_size: self.batch_size,
                transport,
                retry_policy: RetryPolicy::new(
                    self.backoff,
                    retry_predicate,
                    self.rate_limit_config,
                ),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn fetch(&self, _url: &str) -> std::result::Result<String, TransportError> {
            Err(TransportError::network("unreachable"))
        }
    }

    fn client(batch_size: Option<u32>) -> Client {
        let mut builder = Client::builder()
            .base_url("https://api.example.com/v4")
            .unwrap()
            .credentials("TOK123", "SEC456")
            .transport(Arc::new(Unreachable));
        if let Some(size) = batch_size {
            builder = builder.batch_size(size);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_non_paged_url() {
        let endpoint = Endpoint::new(http::Method::DELETE, "survey/12");
        let url = client(Some(50)).request_url(&endpoint, None);

        assert_eq!(
            url.full,
            "https://api.example.com/v4/survey/12?_method=DELETE&api_token=TOK123&api_token_secret=SEC456"
        );
        assert_eq!(
            url.redacted,
            "https://api.example.com/v4/survey/12?_method=DELETE&api_token=***&api_token_secret=***"
        );
    }

    #[test]
    fn test_paged_url_with_batch_size() {
        let url = client(Some(50)).request_url(&Endpoint::get("survey"), Some(3));

        assert_eq!(
            url.full,
            "https://api.example.com/v4/survey?api_token=TOK123&api_token_secret=SEC456&resultsperpage=50&page=3"
        );
    }

    #[test]
    fn test_paged_url_without_batch_size() {
        for batch_size in [None, Some(0)] {
            let url = client(batch_size).request_url(&Endpoint::get("survey"), Some(1));
            assert!(url.full.ends_with("api_token_secret=SEC456&page=1"), "{}", url.full);
        }
    }

    #[test]
    fn test_build_requires_credentials() {
        let missing = Client::builder().transport(Arc::new(Unreachable)).build();
        let empty = Client::builder()
            .credentials("TOK123", "")
            .transport(Arc::new(Unreachable))
            .build();

        assert!(matches!(missing, Err(Error::ConfigurationError(_))));
        assert!(matches!(empty, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_default_base_url() {
        let client = Client::builder()
            .credentials("t", "s")
            .transport(Arc::new(Unreachable))
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
    }

    struct Echo(&'static str);

    #[async_trait]
    impl Transport for Echo {
        async fn fetch(&self, _url: &str) -> std::result::Result<String, TransportError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_type_mismatch_error_is_scrubbed() {
        let client = Client::builder()
            .credentials("TOK123", "SEC456")
            .transport(Arc::new(Echo(r#"{"result_ok":true,"data":{"id":"TOK123"}}"#)))
            .build()
            .unwrap();
        let url = client.request_url(&Endpoint::get("survey/1"), None);

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Record {
            id: u32,
        }

        let err = client
            .fetch_page::<Record>(&url, Shape::Wrapped, None, 1)
            .await
            .unwrap_err();

        match &err {
            Error::DeserializationFailed { serde_error, .. } => {
                assert!(serde_error.contains("***"), "{}", serde_error);
            }
            other => panic!("Expected DeserializationFailed, got {:?}", other),
        }
        assert!(!format!("{} {:?}", err, err).contains("TOK123"));
    }

    #[tokio::test]
    async fn test_transport_error_is_redacted() {
        let client = client(None);
        let url = client.request_url(&Endpoint::get("survey"), None);

        let err = client
            .fetch_page::<serde_json::Value>(&url, Shape::Direct, None, 1)
            .await
            .unwrap_err();

        let rendered = format!("{} {:?}", err, err);
        assert!(!rendered.contains("TOK123"));
        assert!(!rendered.contains("SEC456"));
        assert_eq!(err.url(), Some(url.redacted.as_str()));
    }
}
