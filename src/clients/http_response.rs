//! HTTP response types.

use std::collections::HashMap;

use crate::clients::errors::HttpResponseError;

/// An HTTP response.
///
/// Header names are lowercased. `body` is the parsed JSON body, or
/// `Value::Null` when the body is empty or not JSON; `text` always holds the
/// raw body so error paths can report what the server actually said.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// The raw response body.
    pub text: String,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing `text` as JSON when possible.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, text: String) -> Self {
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
        Self {
            code,
            headers,
            body,
            text,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header (name is case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Returns the `X-Shopify-API-Deprecated-Reason` header value, if present.
    #[must_use]
    pub fn deprecation_reason(&self) -> Option<&str> {
        self.header("x-shopify-api-deprecated-reason")
    }

    /// Converts a non-successful response into an error carrying its status,
    /// body and request ID.
    #[must_use]
    pub fn error(&self) -> HttpResponseError {
        HttpResponseError {
            code: self.code,
            message: self.text.clone(),
            error_reference: self.request_id().map(str::to_string),
        }
    }
}
