//! Server side of the secure cookie storage.
//!
//! [`CookieProxy`] implements the cookie API called by
//! [`CookieTokenStorage`](crate::storage::CookieTokenStorage). Handlers take
//! and return plain [`http`] types so any framework can host them;
//! [`router`] mounts them on axum.
//!
//! | Route | Effect |
//! |---|---|
//! | `POST /token-exchange` | exchanges `{code, codeVerifier}`, sets cookies, returns the token set |
//! | `POST /refresh` | refreshes with the refresh-token cookie, sets cookies, returns the token set |
//! | `GET /get-tokens` | returns the token set read from cookies, 401 if absent |
//! | `POST /set-tokens` | stores the posted token set in cookies |
//! | `POST /clear-tokens` | expires every session cookie |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopify_customer_auth::server::cookie_proxy::{router, CookieProxy};
//!
//! let proxy = Arc::new(CookieProxy::new(config)?);
//! let app = axum::Router::new().nest("/api/auth", router(proxy));
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use http::header::{CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::auth::oauth::{exchange_code_for_tokens, refresh_access_token, GrantType, OAuthError};
use crate::auth::{now_ms, TokenSet};
use crate::clients::{HttpClient, HttpError};
use crate::config::CustomerAuthConfig;
use crate::server::cookies::{
    clearing_cookies, cookie_value, token_cookies, tokens_from_cookies, REFRESH_TOKEN_COOKIE,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenExchangeBody {
    code: String,
    code_verifier: String,
}

/// The cookie API.
#[derive(Clone, Debug)]
pub struct CookieProxy {
    config: CustomerAuthConfig,
    http: HttpClient,
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CookieProxy>();
};

impl CookieProxy {
    /// Creates a proxy with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the HTTP client cannot be created.
    pub fn new(config: CustomerAuthConfig) -> Result<Self, HttpError> {
        let http = HttpClient::new(&config)?;
        Ok(Self::with_http_client(config, http))
    }

    /// Creates a proxy that shares an existing [`HttpClient`].
    #[must_use]
    pub const fn with_http_client(config: CustomerAuthConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    /// Handles `POST /token-exchange`.
    pub async fn token_exchange(&self, body: &str) -> Response<String> {
        let Ok(body) = serde_json::from_str::<TokenExchangeBody>(body) else {
            return error_response(StatusCode::BAD_REQUEST, "invalid_request", &[]);
        };

        match exchange_code_for_tokens(&self.http, &self.config, &body.code, &body.code_verifier)
            .await
        {
            Ok(response) => tokens_response(&TokenSet::from_response(response, now_ms())),
            Err(e) => {
                tracing::warn!("Cookie API token exchange failed: {e}");
                oauth_error_response(&e)
            }
        }
    }

    /// Handles `POST /refresh`.
    ///
    /// A rejected refresh token also expires every session cookie.
    pub async fn refresh(&self, headers: &HeaderMap) -> Response<String> {
        let Some(refresh_token) = cookie_value(headers, REFRESH_TOKEN_COOKIE) else {
            return error_response(StatusCode::UNAUTHORIZED, "no_refresh_token", &[]);
        };
        let previous = tokens_from_cookies(headers).unwrap_or_else(|| TokenSet {
            access_token: String::new(),
            refresh_token: Some(refresh_token.clone()),
            id_token: None,
            token_type: "Bearer".to_string(),
            expires_in: 0,
            scope: String::new(),
            issued_at: 0,
        });

        match refresh_access_token(&self.http, &self.config, &refresh_token).await {
            Ok(response) => tokens_response(&TokenSet::from_refresh(response, &previous, now_ms())),
            Err(e) => {
                tracing::warn!("Cookie API refresh failed: {e}");
                oauth_error_response(&e)
            }
        }
    }

    /// Handles `GET /get-tokens`.
    #[must_use]
    pub fn get_tokens(&self, headers: &HeaderMap) -> Response<String> {
        match tokens_from_cookies(headers) {
            Some(tokens) => match serde_json::to_string(&tokens) {
                Ok(body) => respond(StatusCode::OK, body, &[]),
                Err(_) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", &[]),
            },
            None => error_response(StatusCode::UNAUTHORIZED, "no_session", &[]),
        }
    }

    /// Handles `POST /set-tokens`.
    #[must_use]
    pub fn set_tokens(&self, body: &str) -> Response<String> {
        let Ok(tokens) = serde_json::from_str::<TokenSet>(body) else {
            return error_response(StatusCode::BAD_REQUEST, "invalid_request", &[]);
        };
        match token_cookies(&tokens) {
            Ok(cookies) => respond(StatusCode::OK, json!({ "success": true }).to_string(), &cookies),
            Err(_) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", &[]),
        }
    }

    /// Handles `POST /clear-tokens`.
    #[must_use]
    pub fn clear_tokens(&self) -> Response<String> {
        respond(
            StatusCode::OK,
            json!({ "success": true }).to_string(),
            &clearing_cookies(),
        )
    }
}

/// Mounts a [`CookieProxy`] on an axum router.
///
/// Nest the result under the path configured as the cookie API URL.
pub fn router(proxy: Arc<CookieProxy>) -> Router {
    Router::new()
        .route("/token-exchange", post(token_exchange))
        .route("/refresh", post(refresh))
        .route("/get-tokens", get(get_tokens))
        .route("/set-tokens", post(set_tokens))
        .route("/clear-tokens", post(clear_tokens))
        .with_state(proxy)
}

async fn token_exchange(State(proxy): State<Arc<CookieProxy>>, body: String) -> Response<String> {
    proxy.token_exchange(&body).await
}

async fn refresh(State(proxy): State<Arc<CookieProxy>>, headers: HeaderMap) -> Response<String> {
    proxy.refresh(&headers).await
}

async fn get_tokens(State(proxy): State<Arc<CookieProxy>>, headers: HeaderMap) -> Response<String> {
    proxy.get_tokens(&headers)
}

async fn set_tokens(State(proxy): State<Arc<CookieProxy>>, body: String) -> Response<String> {
    proxy.set_tokens(&body)
}

async fn clear_tokens(State(proxy): State<Arc<CookieProxy>>) -> Response<String> {
    proxy.clear_tokens()
}

fn tokens_response(tokens: &TokenSet) -> Response<String> {
    match (token_cookies(tokens), serde_json::to_string(tokens)) {
        (Ok(cookies), Ok(body)) => respond(StatusCode::OK, body, &cookies),
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", &[]),
    }
}

fn oauth_error_response(error: &OAuthError) -> Response<String> {
    match error {
        OAuthError::InvalidGrant {
            grant_type: GrantType::RefreshToken,
            ..
        } => error_response(StatusCode::UNAUTHORIZED, "invalid_grant", &clearing_cookies()),
        OAuthError::InvalidGrant { .. } => {
            error_response(StatusCode::BAD_REQUEST, "invalid_grant", &[])
        }
        _ => error_response(StatusCode::BAD_GATEWAY, "token_request_failed", &[]),
    }
}

fn error_response(status: StatusCode, code: &str, cookies: &[String]) -> Response<String> {
    respond(status, json!({ "error": code }).to_string(), cookies)
}

fn respond(status: StatusCode, body: String, cookies: &[String]) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    for cookie in cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Dropping unencodable Set-Cookie header: {e}"),
        }
    }
    response
}
