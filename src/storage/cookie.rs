//! Production token backend: httpOnly cookies behind the cookie API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::auth::TokenSet;
use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::config::CustomerAuthConfig;
use crate::storage::{StorageError, StorageKind, TokenStorage};

/// Token storage backed by the server-mediated cookie API.
///
/// Tokens never touch client-side storage: the cookie API sets and reads
/// httpOnly cookies, and this backend only calls it with credentials. The
/// [`HttpClient`] must keep a cookie jar
/// ([`HttpClient::with_cookie_store`]) for those cookies to be replayed.
///
/// Every call carries the configured storage timeout. On read, a timeout,
/// 401 or 404 means there is no session.
///
/// # Example
///
/// ```rust,ignore
/// use shopify_customer_auth::storage::{CookieTokenStorage, TokenStorage};
///
/// let storage = CookieTokenStorage::from_config(&config)?;
/// if let Some(tokens) = storage.read().await? {
///     println!("session expires at {}", tokens.expires_at_ms());
/// }
/// ```
#[derive(Clone, Debug)]
pub struct CookieTokenStorage {
    http: HttpClient,
    base_url: String,
    timeout: Duration,
}

impl CookieTokenStorage {
    /// Creates a backend calling the cookie API at `base_url`.
    #[must_use]
    pub fn new(http: HttpClient, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// Creates a backend from the cookie API URL and timeout in `config`,
    /// with its own cookie-keeping client.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotConfigured`] if the config has no cookie
    /// API URL, or [`StorageError::Http`] if the client cannot be built.
    pub fn from_config(config: &CustomerAuthConfig) -> Result<Self, StorageError> {
        let base_url = config.cookie_api_url().ok_or(StorageError::NotConfigured)?;
        let http = HttpClient::with_cookie_store(config)?;
        Ok(Self::new(http, base_url, config.storage_timeout()))
    }

    /// Returns the cookie API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Asks the cookie API to exchange an authorization code server-side.
    ///
    /// The API sets the token cookies on success and echoes the token set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CookieApi`] if the API rejects the exchange.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, StorageError> {
        let body = json!({ "code": code, "codeVerifier": code_verifier });
        let response = self
            .call(HttpMethod::Post, "token-exchange", Some(body))
            .await?;
        Self::expect_tokens("token-exchange", &response)
    }

    /// Asks the cookie API to refresh using the refresh-token cookie.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CookieApi`] if the API rejects the refresh.
    pub async fn refresh(&self) -> Result<TokenSet, StorageError> {
        let response = self
            .call(HttpMethod::Post, "refresh", Some(json!({})))
            .await?;
        Self::expect_tokens("refresh", &response)
    }

    async fn call(
        &self,
        method: HttpMethod,
        endpoint: &'static str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, StorageError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut builder = HttpRequest::builder(method, url).timeout(self.timeout);
        if let Some(body) = body {
            builder = builder.body(RequestBody::Json(body));
        }
        let request = builder.build().map_err(HttpError::from)?;
        Ok(self.http.request(request).await?)
    }

    fn expect_tokens(
        endpoint: &'static str,
        response: &HttpResponse,
    ) -> Result<TokenSet, StorageError> {
        if !response.is_ok() {
            return Err(StorageError::CookieApi {
                endpoint,
                source: response.error(),
            });
        }
        Ok(serde_json::from_str(&response.text)?)
    }

    fn expect_ok(endpoint: &'static str, response: &HttpResponse) -> Result<(), StorageError> {
        if response.is_ok() {
            Ok(())
        } else {
            Err(StorageError::CookieApi {
                endpoint,
                source: response.error(),
            })
        }
    }
}

#[async_trait]
impl TokenStorage for CookieTokenStorage {
    async fn read(&self) -> Result<Option<TokenSet>, StorageError> {
        let response = match self.call(HttpMethod::Get, "get-tokens", None).await {
            Ok(response) => response,
            Err(StorageError::Http(HttpError::Timeout { url })) => {
                tracing::warn!("Cookie API timed out reading tokens from {url}; treating as signed out");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match response.code {
            401 | 404 => {
                tracing::debug!(status = response.code, "No session cookies");
                Ok(None)
            }
            _ => Self::expect_tokens("get-tokens", &response).map(Some),
        }
    }

    async fn write(&self, tokens: &TokenSet) -> Result<(), StorageError> {
        let body = serde_json::to_value(tokens)?;
        let response = self.call(HttpMethod::Post, "set-tokens", Some(body)).await?;
        Self::expect_ok("set-tokens", &response)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let response = self
            .call(HttpMethod::Post, "clear-tokens", Some(json!({})))
            .await?;
        Self::expect_ok("clear-tokens", &response)
    }

    fn kind(&self) -> StorageKind {
        StorageKind::SecureCookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientId, Environment, RedirectUri, ShopId};

    fn config(cookie_api_url: Option<&str>) -> CustomerAuthConfig {
        let mut builder = CustomerAuthConfig::builder()
            .client_id(ClientId::new("client").unwrap())
            .shop_id(ShopId::new("1").unwrap())
            .redirect_uri(RedirectUri::new("https://store.example.com/callback").unwrap());
        builder = match cookie_api_url {
            Some(url) => builder.cookie_api_url(url),
            None => builder.environment(Environment::Development),
        };
        builder.build().unwrap()
    }

    #[test]
    fn test_from_config_requires_cookie_api_url() {
        assert!(matches!(
            CookieTokenStorage::from_config(&config(None)),
            Err(StorageError::NotConfigured)
        ));

        let storage =
            CookieTokenStorage::from_config(&config(Some("https://store.example.com/api/auth/")))
                .unwrap();
        assert_eq!(storage.base_url(), "https://store.example.com/api/auth");
        assert_eq!(storage.kind(), StorageKind::SecureCookies);
    }
}
