//! HTTP-specific error types.
//!
//! The transport does not treat non-2xx responses as errors: token endpoint,
//! GraphQL and cookie API callers each classify statuses themselves. What is
//! left here is what can go wrong before a response exists, plus
//! [`HttpResponseError`] for callers that want a plain status failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_customer_auth::clients::HttpError;
//!
//! match client.request(request).await {
//!     Ok(response) => println!("{}: {}", response.code, response.body),
//!     Err(HttpError::Timeout { url }) => println!("{url} timed out"),
//!     Err(e) => println!("transport failure: {e}"),
//! }
//! ```

use thiserror::Error;

/// A non-successful response, kept for error reporting.
///
/// Built with [`HttpResponse::error`](crate::clients::HttpResponse::error).
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 404,
///     message: r#"{"error":"Not found"}"#.to_string(),
///     error_reference: Some("abc-123".to_string()),
/// };
/// assert_eq!(error.to_string(), "HTTP 404: {\"error\":\"Not found\"}");
/// ```
#[derive(Debug, Error)]
#[error("HTTP {code}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The response body, or a summary of it.
    pub message: String,
    /// Reference ID for error reporting (from X-Request-Id header).
    pub error_reference: Option<String>,
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The URL is not absolute.
    #[error("Invalid request URL '{url}'.")]
    InvalidUrl {
        /// The URL that was provided.
        url: String,
    },

    /// A GET request was given a body.
    #[error("Cannot send a body with a GET request.")]
    BodyOnGet,
}

/// Unified error type for HTTP transport failures.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// The request did not complete within its timeout.
    #[error("Request to {url} timed out")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns `true` for failures worth retrying later (timeouts and
    /// connection errors).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::InvalidRequest(_) => false,
        }
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};
