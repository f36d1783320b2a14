//! Session cookie encoding.
//!
//! A token set is split over three httpOnly cookies:
//!
//! | Cookie | Value |
//! |---|---|
//! | `shopify-access-token` | the access token |
//! | `shopify-refresh-token` | the refresh token, when there is one |
//! | `shopify-token-data` | percent-encoded JSON of the ID token and the non-secret fields |
//!
//! Every cookie is `HttpOnly; Secure; SameSite=Strict; Path=/` with a
//! `Max-Age` equal to the access token lifetime.

use std::collections::HashMap;

use http::header::COOKIE;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::auth::TokenSet;

/// Cookie holding the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "shopify-access-token";
/// Cookie holding the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "shopify-refresh-token";
/// Cookie holding the remaining token set fields.
pub const TOKEN_DATA_COOKIE: &str = "shopify-token-data";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenData {
    #[serde(default)]
    id_token: Option<String>,
    token_type: String,
    expires_in: u64,
    #[serde(default)]
    scope: String,
    issued_at: i64,
}

/// Formats a `Set-Cookie` value with the session attributes.
#[must_use]
pub fn session_cookie(name: &str, value: &str, max_age: u64) -> String {
    format!(
        "{name}={}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={max_age}",
        urlencoding::encode(value)
    )
}

/// Formats a `Set-Cookie` value that deletes `name`.
#[must_use]
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0")
}

/// Returns the `Set-Cookie` values that store `tokens`.
///
/// # Errors
///
/// Returns a serialization error if the token data cannot be encoded.
pub fn token_cookies(tokens: &TokenSet) -> Result<Vec<String>, serde_json::Error> {
    let max_age = tokens.expires_in;
    let data = serde_json::to_string(&TokenData {
        id_token: tokens.id_token.clone(),
        token_type: tokens.token_type.clone(),
        expires_in: tokens.expires_in,
        scope: tokens.scope.clone(),
        issued_at: tokens.issued_at,
    })?;

    let mut cookies = vec![session_cookie(ACCESS_TOKEN_COOKIE, &tokens.access_token, max_age)];
    match &tokens.refresh_token {
        Some(refresh_token) => {
            cookies.push(session_cookie(REFRESH_TOKEN_COOKIE, refresh_token, max_age));
        }
        None => cookies.push(expired_cookie(REFRESH_TOKEN_COOKIE)),
    }
    cookies.push(session_cookie(TOKEN_DATA_COOKIE, &data, max_age));
    Ok(cookies)
}

/// Returns the `Set-Cookie` values that delete every session cookie.
#[must_use]
pub fn clearing_cookies() -> Vec<String> {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, TOKEN_DATA_COOKIE]
        .into_iter()
        .map(expired_cookie)
        .collect()
}

/// Parses every `Cookie` header into a name/value map, percent-decoding the
/// values. The first occurrence of a name wins.
#[must_use]
pub fn request_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for header in headers.get_all(COOKIE) {
        let Ok(header) = header.to_str() else {
            continue;
        };
        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let value = urlencoding::decode(value.trim())
                .map_or_else(|_| value.trim().to_string(), |v| v.into_owned());
            cookies.entry(name.trim().to_string()).or_insert(value);
        }
    }
    cookies
}

/// Returns one decoded cookie value, if present and non-empty.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    request_cookies(headers)
        .remove(name)
        .filter(|value| !value.is_empty())
}

/// Rebuilds the token set from the session cookies.
///
/// Returns `None` unless both the access token and the token data cookie
/// are present and readable.
#[must_use]
pub fn tokens_from_cookies(headers: &HeaderMap) -> Option<TokenSet> {
    let mut cookies = request_cookies(headers);
    let access_token = cookies.remove(ACCESS_TOKEN_COOKIE).filter(|v| !v.is_empty())?;
    let data = cookies.remove(TOKEN_DATA_COOKIE)?;
    let data: TokenData = match serde_json::from_str(&data) {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!("Ignoring unreadable token data cookie: {e}");
            return None;
        }
    };

    Some(TokenSet {
        access_token,
        refresh_token: cookies.remove(REFRESH_TOKEN_COOKIE).filter(|v| !v.is_empty()),
        id_token: data.id_token,
        token_type: data.token_type,
        expires_in: data.expires_in,
        scope: data.scope,
        issued_at: data.issued_at,
    })
}
