//! OAuth-specific error types.
//!
//! # Taxonomy
//!
//! - **Configuration**: [`OAuthError::InvalidShopId`], [`OAuthError::InvalidClient`],
//!   [`OAuthError::MissingOrigin`], [`OAuthError::MissingUserAgent`]. Fatal.
//! - **PKCE malformation**: [`OAuthError::InvalidGrant`] on the authorization
//!   code grant. Fatal, indicates a bug.
//! - **Expired or revoked credentials**: [`OAuthError::InvalidGrant`] on the
//!   refresh grant. The session must be discarded and the customer must log in again.
//! - **Callback problems**: state, code, nonce and provider denials. The
//!   login attempt is over.
//! - **Transient**: network failures and timeouts. The caller may retry.
//!
//! # Example
//!
//! ```rust
//! use shopify_customer_auth::auth::oauth::{GrantType, OAuthError};
//!
//! let error = OAuthError::InvalidGrant {
//!     grant_type: GrantType::RefreshToken,
//!     description: "refresh token expired".to_string(),
//! };
//! assert!(error.requires_reauthentication());
//! assert!(!error.is_fatal());
//! ```

use crate::auth::oauth::token_request::GrantType;
use crate::clients::HttpError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during the customer login flow and token lifecycle.
///
/// # Thread Safety
///
/// `OAuthError` is `Send + Sync`, making it safe to use across async boundaries.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The token endpoint answered HTTP 301.
    ///
    /// This happens when the shop ID is not the numeric shop identifier.
    #[error("Token endpoint redirected the request for shop '{shop_id}'. Use the numeric shop ID, not the shop domain.")]
    InvalidShopId {
        /// The configured shop ID.
        shop_id: String,
    },

    /// The provider rejected the grant (`invalid_grant`).
    ///
    /// On the authorization code grant this means the code or the PKCE
    /// verifier is malformed or does not match. On the refresh grant it means
    /// the refresh token expired or was revoked.
    #[error("Invalid {grant_type} grant: {description}")]
    InvalidGrant {
        /// The grant that was rejected.
        grant_type: GrantType,
        /// The provider's `error_description`.
        description: String,
    },

    /// The provider rejected the client ID (`invalid_client`).
    #[error("Client authentication failed: {description}. Check the Customer Account API client ID.")]
    InvalidClient {
        /// The provider's `error_description`.
        description: String,
    },

    /// The provider answered `invalid_token`, which it does for browser-origin
    /// clients when the `Origin` header is missing.
    #[error("Token request rejected: the Origin header is missing or not registered for this client")]
    MissingOrigin,

    /// The provider answered HTTP 403, which it does when no `User-Agent` is sent.
    #[error("Token request forbidden: a User-Agent header is required")]
    MissingUserAgent,

    /// Any other token endpoint failure.
    #[error("Token request failed with status {status}: {message}")]
    TokenRequestFailed {
        /// The HTTP status code returned.
        status: u16,
        /// `"<error> - <error_description>"`, or the raw body.
        message: String,
    },

    /// The token endpoint returned 2xx with a body that is not a token response.
    #[error("Invalid token response: {reason}")]
    InvalidTokenResponse {
        /// What was wrong.
        reason: String,
    },

    /// The callback `state` is missing or does not match the pending authorization.
    #[error("State parameter mismatch (received {received:?})")]
    InvalidState {
        /// The state received in the callback.
        received: Option<String>,
    },

    /// The callback carried no authorization code.
    #[error("Authorization callback is missing the 'code' parameter")]
    MissingCode,

    /// The provider redirected back with an `error` parameter.
    #[error("Authorization was denied by the provider: {error}")]
    ProviderDenied {
        /// The provider's `error` code.
        error: String,
        /// The provider's `error_description`, if any.
        description: Option<String>,
    },

    /// The callback could not be parsed.
    #[error("Invalid callback: {reason}")]
    InvalidCallback {
        /// What was wrong.
        reason: String,
    },

    /// The browser denied access to first-party storage, so secure cookies
    /// cannot be used.
    #[error("Storage access was denied. Allow cookies for this site, or sign in from a top-level window.")]
    StorageAccessDenied,

    /// There is no stored session.
    #[error("No customer session is stored")]
    NoSession,

    /// The stored session has no refresh token.
    #[error("The stored session has no refresh token")]
    NoRefreshToken,

    /// The ID token could not be decoded.
    #[error("Invalid ID token: {reason}")]
    InvalidIdToken {
        /// Why decoding failed.
        reason: String,
    },

    /// The ID token's `nonce` claim does not match the pending authorization.
    #[error("ID token nonce does not match the login request")]
    NonceMismatch,

    /// A token storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Wrapped HTTP client error.
    #[error(transparent)]
    HttpError(#[from] HttpError),
}

impl OAuthError {
    /// Returns `true` for configuration and programming errors that will not
    /// go away by retrying or logging in again.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidShopId { .. }
                | Self::InvalidClient { .. }
                | Self::MissingOrigin
                | Self::MissingUserAgent
                | Self::InvalidTokenResponse { .. }
                | Self::InvalidGrant {
                    grant_type: GrantType::AuthorizationCode,
                    ..
                }
        )
    }

    /// Returns `true` for failures that may succeed if retried later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError(e) => e.is_transient(),
            Self::Storage(e) => e.is_transient(),
            Self::TokenRequestFailed { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` when the only way forward is a fresh login.
    #[must_use]
    pub const fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::InvalidGrant {
                grant_type: GrantType::RefreshToken,
                ..
            } | Self::NoSession
                | Self::NoRefreshToken
                | Self::InvalidState { .. }
                | Self::MissingCode
                | Self::ProviderDenied { .. }
                | Self::NonceMismatch
                | Self::InvalidIdToken { .. }
        )
    }

    /// Returns a short message that is safe to show to a customer.
    ///
    /// Provider descriptions, tokens and URLs are never included.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        if self.is_transient() {
            return "We couldn't reach the sign-in service. Please try again.";
        }
        match self {
            Self::StorageAccessDenied => {
                "Your browser blocked the cookies needed to sign in. Allow cookies for this site and try again."
            }
            Self::ProviderDenied { .. } => "Sign-in was cancelled.",
            _ if self.is_fatal() => "Sign-in is unavailable right now. Please contact the store.",
            _ if self.requires_reauthentication() => "Your session has ended. Please sign in again.",
            _ => "Something went wrong while signing in. Please try again.",
        }
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
