//! Rate limiting: request spacing for the HTTP transport, and parsing of the
//! rate limit headers the service sends with `429 Too Many Requests`.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Information extracted from rate limit headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// When the rate limit resets (`X-RateLimit-Reset` or `RateLimit-Reset`).
    pub reset_at: Option<SystemTime>,

    /// How long to wait before retrying (`Retry-After`).
    pub retry_after: Option<Duration>,

    /// Number of requests remaining in the current window.
    pub remaining: Option<u64>,
}

impl RateLimitInfo {
    /// Extracts rate limit information from response headers.
    ///
    /// Returns `None` when the headers do not describe an active limit, i.e.
    /// there is no `Retry-After` and the remaining quota is not zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use gizmo_client::rate_limit::RateLimitInfo;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("retry-after", "60".parse().unwrap());
    ///
    /// let info = RateLimitInfo::from_headers(&headers).unwrap();
    /// assert_eq!(info.retry_after, Some(std::time::Duration::from_secs(60)));
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let info = Self {
            reset_at: parse_reset(headers),
            retry_after: parse_retry_after(headers),
            remaining: header_str(headers, "x-ratelimit-remaining").and_then(|v| v.parse().ok()),
        };
        info.is_rate_limited().then_some(info)
    }

    /// Returns the recommended delay before retrying, capped by `max_wait`.
    ///
    /// `Retry-After` wins over the reset timestamp. A reset time already in
    /// the past yields `None`.
    pub fn delay(&self, max_wait: Duration) -> Option<Duration> {
        if let Some(retry_after) = self.retry_after {
            return Some(retry_after.min(max_wait));
        }

        let until_reset = self.reset_at?.duration_since(SystemTime::now()).ok()?;
        Some(until_reset.min(max_wait))
    }

    /// Returns `true` if this represents an active rate limit.
    pub fn is_rate_limited(&self) -> bool {
        self.retry_after.is_some() || self.remaining == Some(0)
    }
}

/// How the retry policy reacts to rate limit information on a failed attempt.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether the wait indicated by the server replaces the backoff delay.
    pub enabled: bool,

    /// Upper bound on any single rate limit wait. Defaults to 5 minutes.
    pub max_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_wait: Duration::from_secs(300),
        }
    }
}

impl RateLimitConfig {
    /// Server-indicated waits are ignored; only the backoff applies.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Honors server-indicated waits up to `max_wait`.
    pub fn with_max_wait(max_wait: Duration) -> Self {
        Self {
            enabled: true,
            max_wait,
        }
    }
}

/// Enforces a minimum interval between consecutive requests.
///
/// The service allows a fixed number of calls per minute per account, so the
/// HTTP transport spaces its requests out instead of relying on 429s.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Creates a throttle allowing one request per `min_interval`.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until the next request may be sent, then claims the slot.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                tracing::debug!(
                    wait_ms = (ready_at - Instant::now()).as_millis(),
                    "Throttling request"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

/// Parses `Retry-After` as delay-seconds or an HTTP date.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = header_str(headers, "retry-after")?;

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    httpdate::parse_http_date(header)
        .ok()?
        .duration_since(SystemTime::now())
        .ok()
}

/// Parses `X-RateLimit-Reset`, falling back to `RateLimit-Reset` (Unix seconds).
fn parse_reset(headers: &HeaderMap) -> Option<SystemTime> {
    ["x-ratelimit-reset", "ratelimit-reset"]
        .iter()
        .find_map(|name| header_str(headers, name)?.parse::<u64>().ok())
        .map(|timestamp| UNIX_EPOCH + Duration::from_secs(timestamp))
}
