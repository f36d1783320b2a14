//! Authorization code exchange.
//!
//! After the provider redirects back with a `code`, the code and the PKCE
//! verifier kept since [`begin_auth`](crate::auth::oauth::begin_auth) are
//! exchanged for a token set.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_customer_auth::auth::oauth::exchange_code_for_tokens;
//! use shopify_customer_auth::{now_ms, TokenSet};
//!
//! let response = exchange_code_for_tokens(&http, &config, &code, &pending.code_verifier).await?;
//! let tokens = TokenSet::from_response(response, now_ms());
//! ```

use crate::auth::oauth::token_request::{request_tokens, TokenGrant};
use crate::auth::oauth::OAuthError;
use crate::auth::TokenResponse;
use crate::clients::HttpClient;
use crate::config::CustomerAuthConfig;

/// Exchanges an authorization code for tokens.
///
/// The response carries no receipt time; stamp it with
/// [`TokenSet::from_response`](crate::TokenSet::from_response).
///
/// # Errors
///
/// A verifier that does not match the challenge sent on the authorize
/// request yields [`OAuthError::InvalidGrant`] with
/// [`GrantType::AuthorizationCode`](crate::auth::oauth::GrantType::AuthorizationCode).
/// See [`request_tokens`] for the full mapping.
pub async fn exchange_code_for_tokens(
    http: &HttpClient,
    config: &CustomerAuthConfig,
    code: &str,
    code_verifier: &str,
) -> Result<TokenResponse, OAuthError> {
    let grant = TokenGrant::AuthorizationCode {
        code: code.to_string(),
        code_verifier: code_verifier.to_string(),
    };
    request_tokens(http, config, &grant).await
}
