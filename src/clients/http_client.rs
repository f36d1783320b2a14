//! Shared HTTP transport.
//!
//! This module provides the [`HttpClient`] used by the token endpoint
//! clients, the Customer Account API client and the cookie storage backend.

use std::collections::HashMap;

use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::CustomerAuthConfig;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the `User-Agent` header value for a configuration.
///
/// The token endpoint rejects requests without a user agent (HTTP 403), so
/// every request carries one.
#[must_use]
pub fn user_agent(config: Option<&CustomerAuthConfig>) -> String {
    let prefix = config
        .and_then(CustomerAuthConfig::user_agent_prefix)
        .map_or(String::new(), |prefix| format!("{prefix} | "));
    let rust_version = env!("CARGO_PKG_RUST_VERSION");
    format!("{prefix}Shopify Customer Auth v{SDK_VERSION} | Rust {rust_version}")
}

/// HTTP client shared by every outbound call.
///
/// The client handles:
/// - Default headers (`User-Agent`, `Accept: application/json`)
/// - Body encoding and `Content-Type`
/// - Per-request timeouts, surfaced as [`HttpError::Timeout`]
/// - Redirects are returned, not followed
///
/// Non-2xx responses are returned as `Ok`; callers decide what a status
/// means. There are no automatic retries.
///
/// # Thread Safety
///
/// `HttpClient` is `Clone`, `Send` and `Sync`. Clones share one connection
/// pool (and cookie jar, when enabled).
///
/// # Example
///
/// ```rust,ignore
/// use shopify_customer_auth::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let client = HttpClient::new(&config)?;
/// let request = HttpRequest::builder(HttpMethod::Get, "https://store.example.com/api/auth/get-tokens")
///     .build()?;
/// let response = client.request(request).await?;
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    default_headers: HashMap<String, String>,
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g. TLS initialization failure).
    pub fn new(config: &CustomerAuthConfig) -> Result<Self, HttpError> {
        Self::build(Some(config), false)
    }

    /// Creates a client that keeps a cookie jar, so `Set-Cookie` responses
    /// are replayed on later requests to the same host.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created.
    pub fn with_cookie_store(config: &CustomerAuthConfig) -> Result<Self, HttpError> {
        Self::build(Some(config), true)
    }

    fn build(config: Option<&CustomerAuthConfig>, cookie_store: bool) -> Result<Self, HttpError> {
        // Redirects surface as responses: a 301 from the token endpoint means
        // a bad shop ID and must not be followed as a GET.
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(cookie_store)
            .build()?;

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent(config));
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        Ok(Self {
            client,
            default_headers,
        })
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends an HTTP request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - The request times out (`Timeout`)
    /// - A connection or protocol error occurs (`Network`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder
                .header("Content-Type", body.content_type())
                .body(body.encode());
        }
        for (key, value) in &request.extra_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(timeout) = request.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let res = req_builder
            .send()
            .await
            .map_err(|e| Self::classify(e, &request.url))?;

        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let text = res
            .text()
            .await
            .map_err(|e| Self::classify(e, &request.url))?;

        let response = HttpResponse::new(code, headers, text);

        if let Some(reason) = response.deprecation_reason() {
            tracing::warn!(
                "Deprecated request to {}, received reason: {}",
                request.url,
                reason
            );
        }

        Ok(response)
    }

    fn classify(error: reqwest::Error, url: &str) -> HttpError {
        if error.is_timeout() {
            HttpError::Timeout {
                url: url.to_string(),
            }
        } else {
            HttpError::Network(error)
        }
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
