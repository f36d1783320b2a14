//! Token sets and expiry arithmetic.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Returns the current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Returns `true` once `now_ms` is within `buffer` of the absolute expiry
/// `issued_at_ms + expires_in * 1000`.
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::is_token_expired;
/// use std::time::Duration;
///
/// let issued_at = 1_700_000_000_000;
/// let buffer = Duration::from_secs(300);
/// assert!(!is_token_expired(3600, issued_at, buffer, issued_at + 3_000_000));
/// assert!(is_token_expired(3600, issued_at, buffer, issued_at + 3_301_000));
/// ```
#[must_use]
pub fn is_token_expired(expires_in: u64, issued_at_ms: i64, buffer: Duration, now_ms: i64) -> bool {
    let expires_at = issued_at_ms.saturating_add(secs_to_ms(expires_in));
    let buffer_ms = i64::try_from(buffer.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_add(buffer_ms) >= expires_at
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000)
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// The JSON body of a successful token endpoint response.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,
    /// The refresh token, when issued.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The OpenID Connect ID token, when issued.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Token type, always `Bearer` in practice.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Granted scopes, space-separated.
    #[serde(default)]
    pub scope: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"*****")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "*****"))
            .field("id_token", &self.id_token.as_ref().map(|_| "*****"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// The tokens that make up a customer session.
///
/// A `TokenSet` is replaced as a whole, never patched field by field. Its
/// absolute expiry is always derived from `issued_at + expires_in`.
///
/// # Serialization
///
/// Stored as camelCase JSON:
///
/// ```rust
/// use shopify_customer_auth::TokenSet;
///
/// let json = r#"{"accessToken":"at","refreshToken":"rt","idToken":null,
///     "tokenType":"Bearer","expiresIn":3600,"scope":"openid","issuedAt":1700000000000}"#;
/// let tokens: TokenSet = serde_json::from_str(json).unwrap();
/// assert_eq!(tokens.expires_at_ms(), 1_700_003_600_000);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    /// The access token sent to the Customer Account API.
    pub access_token: String,
    /// The refresh token, if the provider issued one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The OpenID Connect ID token, if issued.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Token type.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Granted scopes, space-separated.
    #[serde(default)]
    pub scope: String,
    /// Wall-clock receipt time, milliseconds since the Unix epoch.
    pub issued_at: i64,
}

impl TokenSet {
    /// Builds a token set from a token endpoint response received at `issued_at_ms`.
    #[must_use]
    pub fn from_response(response: TokenResponse, issued_at_ms: i64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            id_token: response.id_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            scope: response.scope,
            issued_at: issued_at_ms,
        }
    }

    /// Builds the token set that replaces `previous` after a refresh.
    ///
    /// The provider may omit the refresh token and ID token on refresh; the
    /// previous values are kept in that case. An empty scope also falls back.
    #[must_use]
    pub fn from_refresh(response: TokenResponse, previous: &Self, issued_at_ms: i64) -> Self {
        let mut next = Self::from_response(response, issued_at_ms);
        if next.refresh_token.is_none() {
            next.refresh_token.clone_from(&previous.refresh_token);
        }
        if next.id_token.is_none() {
            next.id_token.clone_from(&previous.id_token);
        }
        if next.scope.is_empty() {
            next.scope.clone_from(&previous.scope);
        }
        next
    }

    /// Returns the absolute expiry in milliseconds since the Unix epoch.
    #[must_use]
    pub fn expires_at_ms(&self) -> i64 {
        self.issued_at.saturating_add(secs_to_ms(self.expires_in))
    }

    /// Returns `true` if the access token is inside the `buffer` window at `now_ms`.
    #[must_use]
    pub fn is_expired_at(&self, buffer: Duration, now_ms: i64) -> bool {
        is_token_expired(self.expires_in, self.issued_at, buffer, now_ms)
    }

    /// Returns `true` if the access token is inside the `buffer` window now.
    #[must_use]
    pub fn is_expired(&self, buffer: Duration) -> bool {
        self.is_expired_at(buffer, now_ms())
    }

    /// Returns the seconds left before the absolute expiry, zero once passed.
    #[must_use]
    pub fn remaining_secs(&self, now_ms: i64) -> u64 {
        u64::try_from(self.expires_at_ms().saturating_sub(now_ms) / 1000).unwrap_or(0)
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"*****")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "*****"))
            .field("id_token", &self.id_token.as_ref().map(|_| "*****"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
