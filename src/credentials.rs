//! API credentials and their redaction.

use crate::query::Param;
use std::fmt;

const MASK: &str = "***";

/// The token pair appended to every request as `api_token` and
/// `api_token_secret`.
///
/// The `Debug` output never shows the values, and [`Credentials::scrub`]
/// removes them from any text headed for a log record or an error.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    secret: String,
}

impl Credentials {
    /// Creates credentials from the account's API token and secret.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    /// Returns `true` if either value is empty.
    pub fn is_incomplete(&self) -> bool {
        self.token.is_empty() || self.secret.is_empty()
    }

    /// The query parameters carrying the credentials.
    pub(crate) fn params(&self) -> [Param; 2] {
        [
            Param::required("api_token", Some(self.token.as_str())),
            Param::required("api_token_secret", Some(self.secret.as_str())),
        ]
    }

    /// The same parameters with masked values, for redacted URLs.
    pub(crate) fn masked_params() -> [Param; 2] {
        [
            Param::verbatim("api_token", MASK),
            Param::verbatim("api_token_secret", MASK),
        ]
    }

    /// Replaces every occurrence of either credential, raw or
    /// percent-encoded, with `***`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gizmo_client::Credentials;
    ///
    /// let credentials = Credentials::new("TOK123", "SEC 456");
    /// assert_eq!(
    ///     credentials.scrub("token=TOK123&secret=SEC%20456"),
    ///     "token=***&secret=***"
    /// );
    /// ```
    pub fn scrub(&self, text: &str) -> String {
        let mut scrubbed = text.to_string();
        for value in [&self.token, &self.secret] {
            if value.is_empty() {
                continue;
            }
            let encoded = urlencoding::encode(value);
            if encoded != value.as_str() {
                scrubbed = scrubbed.replace(encoded.as_ref(), MASK);
            }
            scrubbed = scrubbed.replace(value.as_str(), MASK);
        }
        scrubbed
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &MASK)
            .field("secret", &MASK)
            .finish()
    }
}
