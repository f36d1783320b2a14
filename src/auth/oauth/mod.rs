//! OAuth 2.0 Authorization Code flow with PKCE for Shopify customer accounts.
//!
//! The Customer Account API uses a public client: there is no client secret,
//! and possession of the PKCE code verifier is what proves the token request
//! comes from the client that started the login.
//!
//! # Flow
//!
//! 1. **Authorization** ([`begin_auth`]): generate PKCE parameters, persist a
//!    [`PendingAuthorization`] and send the customer to the authorize URL.
//! 2. **Callback** ([`AuthCallback`]): the provider redirects back with
//!    `code` and `state`. [`PendingAuthorization::take`] consumes the stored
//!    values; `state` must match.
//! 3. **Exchange** ([`exchange_code_for_tokens`]): trade the code and verifier
//!    for a token set.
//! 4. **Refresh** ([`refresh_access_token`]): trade the refresh token for a
//!    new access token before the old one expires.
//! 5. **Logout** ([`build_logout_url`]): end the provider session.
//!
//! [`SessionManager`](crate::auth::SessionManager) runs these steps against
//! storage and is what most callers want.
//!
//! # Security Features
//!
//! - **PKCE (S256)**: the verifier never leaves the client until the exchange
//! - **CSRF protection**: `state` is checked before any token request
//! - **Replay binding**: the ID token `nonce` must match the login request
//! - **Single use**: pending values are removed on every callback outcome
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_customer_auth::auth::oauth::{
//!     begin_auth, exchange_code_for_tokens, AuthCallback, AuthorizeOptions, OAuthError,
//!     PendingAuthorization,
//! };
//! use shopify_customer_auth::{now_ms, TokenSet};
//!
//! // Login
//! let result = begin_auth(&config, &AuthorizeOptions::default());
//! result.pending.save(&store)?;
//! // redirect to result.url
//!
//! // Callback
//! let callback = AuthCallback::from_url(&current_url)?;
//! let pending = PendingAuthorization::take(&store)?.ok_or(OAuthError::InvalidState { received: None })?;
//! if callback.state.as_deref() != Some(pending.state.as_str()) {
//!     return Err(OAuthError::InvalidState { received: callback.state });
//! }
//! let code = callback.code.ok_or(OAuthError::MissingCode)?;
//! let response = exchange_code_for_tokens(&http, &config, &code, &pending.code_verifier).await?;
//! let tokens = TokenSet::from_response(response, now_ms());
//! ```

mod begin_auth;
mod callback;
mod error;
mod id_token;
mod logout;
mod pending;
pub mod pkce;
mod token_exchange;
mod token_refresh;
mod token_request;

pub use begin_auth::{authorization_url, begin_auth, AuthorizeOptions, BeginAuthResult};
pub use callback::AuthCallback;
pub use error::OAuthError;
pub use id_token::IdTokenClaims;
pub use logout::build_logout_url;
pub use pending::PendingAuthorization;
pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_nonce, generate_state, PkceParams,
};
pub use token_exchange::exchange_code_for_tokens;
pub use token_refresh::refresh_access_token;
pub use token_request::{request_tokens, GrantType, TokenGrant};
