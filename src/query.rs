//! Request endpoints and query string construction.
//!
//! The API takes everything, including the emulated HTTP verb, as query
//! parameters on a GET request. An [`Endpoint`] is an immutable description of
//! one such request: a verb, a path and an ordered list of [`Param`]s. It is
//! rendered exactly once, when the client turns it into a URL.

use http::Method;

/// One query parameter.
///
/// Optional parameters with an absent or empty value are left out of the
/// query string. Required parameters are always emitted, with an empty value
/// if need be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    value: Option<String>,
    required: bool,
    encode: bool,
}

impl Param {
    /// A parameter that is omitted when `value` is `None` or empty.
    pub fn optional(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            value: value.map(Into::into),
            required: false,
            encode: true,
        }
    }

    /// A parameter that is always emitted.
    pub fn required(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            value: value.map(Into::into),
            required: true,
            encode: true,
        }
    }

    /// A required parameter whose value is emitted without percent-encoding.
    pub(crate) fn verbatim(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            encode: false,
            ..Self::required(name, Some(value))
        }
    }

    /// The parameter name as sent on the wire.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unencoded value, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the `name=value` pair to emit, or `None` if this parameter
    /// is left out.
    fn emitted(&self) -> Option<String> {
        if self.name.is_empty() {
            return None;
        }
        let value = match self.value.as_deref() {
            Some(value) if !value.is_empty() => value,
            _ if self.required => "",
            _ => return None,
        };
        if self.encode {
            Some(format!("{}={}", self.name, urlencoding::encode(value)))
        } else {
            Some(format!("{}={}", self.name, value))
        }
    }
}

/// Types that map onto a fixed, ordered set of query parameters.
///
/// Implementations list their fields explicitly, in the order they are sent,
/// and flag the ones the API expects even when empty.
pub trait QueryParams {
    /// Returns the parameters describing `self`.
    fn query_params(&self) -> Vec<Param>;
}

/// A logical API request: verb, path relative to the base URL, and ordered
/// parameters.
///
/// # Examples
///
/// ```
/// use gizmo_client::query::Endpoint;
/// use http::Method;
///
/// let endpoint = Endpoint::new(Method::PUT, "survey")
///     .param("type", "survey")
///     .param("title", "Customer feedback")
///     .optional("status", None::<&str>);
///
/// assert_eq!(
///     endpoint.to_path_and_query(),
///     "survey?_method=PUT&type=survey&title=Customer%20feedback"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    method: Method,
    path: String,
    params: Vec<Param>,
}

impl Endpoint {
    /// Creates an endpoint for the given verb and path.
    ///
    /// Verbs other than `GET` are sent as a leading `_method` parameter.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Shorthand for a `GET` endpoint.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Adds an optional parameter with a present value.
    pub fn param(self, name: impl Into<String>, value: impl ToString) -> Self {
        self.with(Param::optional(name, Some(value.to_string())))
    }

    /// Adds a parameter that is dropped when `value` is `None` or empty.
    pub fn optional(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.with(Param::optional(name, value))
    }

    /// Adds a parameter that is emitted even when `value` is `None` or empty.
    pub fn required(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.with(Param::required(name, value))
    }

    /// Appends a prepared parameter.
    pub fn with(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Appends every parameter of a [`QueryParams`] value, in its order.
    pub fn with_params(mut self, source: &impl QueryParams) -> Self {
        self.params.extend(source.query_params());
        self
    }

    /// The HTTP verb this endpoint emulates.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path relative to the base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The parameters as supplied, verb emulation excluded.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Renders the path and query string, with no trailing parameters.
    pub fn to_path_and_query(&self) -> String {
        self.render(&[])
    }

    /// Renders the path and query string, appending `trailing` after the
    /// endpoint's own parameters.
    pub(crate) fn render(&self, trailing: &[Param]) -> String {
        let verb = (self.method != Method::GET)
            .then(|| Param::required("_method", Some(self.method.as_str())));
        build_query(
            self.path.trim_start_matches('/'),
            verb.iter().chain(&self.params).chain(trailing),
        )
    }
}

/// Builds `path?name=value&...` from parameters in the order given.
///
/// Values are percent-encoded, leaving only RFC 3986 unreserved characters
/// as-is. Names are emitted verbatim so bracketed field addressing like
/// `from[name]` reaches the server untouched.
///
/// # Examples
///
/// ```
/// use gizmo_client::query::{build_query, Param};
///
/// let params = [
///     Param::optional("sfirstname", Some("Ada")),
///     Param::optional("slastname", None::<&str>),
///     Param::required("sorganization", Some("")),
/// ];
/// assert_eq!(
///     build_query("contact", &params),
///     "contact?sfirstname=Ada&sorganization="
/// );
/// ```
pub fn build_query<'a>(path: &str, params: impl IntoIterator<Item = &'a Param>) -> String {
    let mut url = String::from(path);
    let mut separator = if path.contains('?') { '&' } else { '?' };

    for pair in params.into_iter().filter_map(Param::emitted) {
        url.push(separator);
        url.push_str(&pair);
        separator = '&';
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_of(url: &str) -> Vec<&str> {
        url.split_once('?')
            .map(|(_, q)| q.split('&').collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_sparse_params_keep_insertion_order() {
        let params = vec![
            Param::optional("zeta", Some("1")),
            Param::optional("alpha", None::<String>),
            Param::optional("mid", Some("")),
            Param::optional("beta", Some("2")),
            Param::optional("gamma", Some("3")),
        ];

        let url = build_query("survey", &params);

        // 5 parameters, 2 of them null or empty
        assert_eq!(query_of(&url), vec!["zeta=1", "beta=2", "gamma=3"]);
    }

    #[test]
    fn test_required_params_emit_empty_values() {
        let params = vec![
            Param::required("semailaddress", None::<String>),
            Param::required("sfirstname", Some("")),
            Param::optional("stitle", Some("")),
        ];

        assert_eq!(
            build_query("contact", &params),
            "contact?semailaddress=&sfirstname="
        );
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let params = vec![
            Param::optional("title", Some("Q&A: 100% = yes?")),
            Param::optional("email", Some("a.b+c@example.com")),
            Param::optional("plain", Some("A-z_0.9~")),
        ];

        assert_eq!(
            build_query("survey", &params),
            "survey?title=Q%26A%3A%20100%25%20%3D%20yes%3F&email=a.b%2Bc%40example.com&plain=A-z_0.9~"
        );
    }

    #[test]
    fn test_nameless_params_are_skipped() {
        let params = vec![
            Param::required("", Some("x")),
            Param::optional("page", Some("2")),
        ];

        assert_eq!(build_query("survey", &params), "survey?page=2");
    }

    #[test]
    fn test_bracketed_names_pass_through() {
        let endpoint = Endpoint::new(Method::POST, "survey/1/surveycampaign/2/emailmessage/3")
            .optional("from[name]", Some("Support Team"))
            .optional("from[email]", None::<&str>);

        assert_eq!(
            endpoint.to_path_and_query(),
            "survey/1/surveycampaign/2/emailmessage/3?_method=POST&from[name]=Support%20Team"
        );
    }

    #[test]
    fn test_get_has_no_verb_param() {
        assert_eq!(Endpoint::get("/survey").to_path_and_query(), "survey");
    }

    #[test]
    fn test_trailing_params_follow_endpoint_params() {
        let endpoint = Endpoint::new(Method::DELETE, "survey/7").param("force", true);
        let url = endpoint.render(&[
            Param::required("api_token", Some("t")),
            Param::optional("page", Some("1")),
        ]);

        assert_eq!(url, "survey/7?_method=DELETE&force=true&api_token=t&page=1");
    }

    #[test]
    fn test_verbatim_values_skip_encoding() {
        let params = [
            Param::verbatim("api_token", "***"),
            Param::optional("title", Some("***")),
        ];

        assert_eq!(
            build_query("survey", &params),
            "survey?api_token=***&title=%2A%2A%2A"
        );
    }

    #[test]
    fn test_existing_query_in_path_is_extended() {
        let params = [Param::optional("page", Some("3"))];
        assert_eq!(build_query("survey?type=poll", &params), "survey?type=poll&page=3");
    }
}
