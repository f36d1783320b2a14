//! HTTP request types.
//!
//! This module provides the [`HttpRequest`] type and its builder. Requests
//! carry absolute URLs because they target three different hosts: the
//! identity provider, the Customer Account API and the cookie API.

use std::fmt;
use std::time::Duration;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the authentication flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method.
    Get,
    /// HTTP POST method.
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
        }
    }
}

/// A request body and its content type.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// `application/json`.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded`, encoded in the given order.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Returns the MIME type string for this body.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => "application/json",
            Self::Form(_) => "application/x-www-form-urlencoded",
        }
    }

    /// Encodes the body for the wire.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Form(pairs) => pairs
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&"),
        }
    }
}

/// An HTTP request to be sent by [`HttpClient`](crate::clients::HttpClient).
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::clients::{HttpMethod, HttpRequest, RequestBody};
/// use std::time::Duration;
///
/// let request = HttpRequest::builder(HttpMethod::Post, "https://shopify.com/authentication/1/oauth/token")
///     .body(RequestBody::Form(vec![("grant_type".into(), "refresh_token".into())]))
///     .timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.extra_headers.len(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The absolute request URL.
    pub url: String,
    /// The request body, if any.
    pub body: Option<RequestBody>,
    /// Headers added on top of the client defaults.
    pub extra_headers: Vec<(String, String)>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, url)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the URL is not absolute `http(s)`
    /// or a GET request carries a body.
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            return Err(InvalidHttpRequestError::InvalidUrl {
                url: self.url.clone(),
            });
        }
        if self.http_method == HttpMethod::Get && self.body.is_some() {
            return Err(InvalidHttpRequestError::BodyOnGet);
        }
        Ok(())
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    url: String,
    body: Option<RequestBody>,
    extra_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            http_method: method,
            url: url.into(),
            body: None,
            extra_headers: Vec::new(),
            timeout: None,
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((key.into(), value.into()));
        self
    }

    /// Sets a timeout for this request.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            url: self.url,
            body: self.body,
            extra_headers: self.extra_headers,
            timeout: self.timeout,
        };
        request.verify()?;
        Ok(request)
    }
}
