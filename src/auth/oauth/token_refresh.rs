//! Access token refresh.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_customer_auth::auth::oauth::refresh_access_token;
//! use shopify_customer_auth::{now_ms, TokenSet};
//!
//! let refresh_token = current.refresh_token.as_deref().ok_or(OAuthError::NoRefreshToken)?;
//! let response = refresh_access_token(&http, &config, refresh_token).await?;
//! let next = TokenSet::from_refresh(response, &current, now_ms());
//! ```

use crate::auth::oauth::token_request::{request_tokens, TokenGrant};
use crate::auth::oauth::OAuthError;
use crate::auth::TokenResponse;
use crate::clients::HttpClient;
use crate::config::CustomerAuthConfig;

/// Trades a refresh token for a new access token.
///
/// The provider may omit the refresh token and ID token from the response;
/// [`TokenSet::from_refresh`](crate::TokenSet::from_refresh) carries the
/// previous ones forward.
///
/// # Errors
///
/// An expired or revoked refresh token yields [`OAuthError::InvalidGrant`]
/// with [`GrantType::RefreshToken`](crate::auth::oauth::GrantType::RefreshToken).
/// See [`request_tokens`] for the full mapping.
pub async fn refresh_access_token(
    http: &HttpClient,
    config: &CustomerAuthConfig,
    refresh_token: &str,
) -> Result<TokenResponse, OAuthError> {
    let grant = TokenGrant::RefreshToken {
        refresh_token: refresh_token.to_string(),
    };
    request_tokens(http, config, &grant).await
}
