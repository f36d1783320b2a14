//! Authorization URL generation.
//!
//! This module provides [`begin_auth`], the first step of the Authorization
//! Code flow with PKCE. It generates fresh PKCE parameters and builds the URL
//! the customer is sent to. Nothing is persisted here: the caller stores the
//! returned [`PendingAuthorization`] until the callback arrives.
//!
//! # Example
//!
//! ```rust
//! use shopify_customer_auth::{ClientId, CustomerAuthConfig, Environment, RedirectUri, ShopId};
//! use shopify_customer_auth::auth::oauth::{begin_auth, AuthorizeOptions};
//!
//! let config = CustomerAuthConfig::builder()
//!     .client_id(ClientId::new("shp_client").unwrap())
//!     .shop_id(ShopId::new("12345").unwrap())
//!     .redirect_uri(RedirectUri::new("http://localhost:3000/callback").unwrap())
//!     .environment(Environment::Development)
//!     .build()
//!     .unwrap();
//!
//! let result = begin_auth(&config, &AuthorizeOptions::default());
//! assert!(result.url.starts_with("https://shopify.com/authentication/12345/oauth/authorize?"));
//! assert!(result.url.contains("code_challenge_method=S256"));
//! ```

use crate::auth::oauth::pending::PendingAuthorization;
use crate::auth::oauth::pkce::PkceParams;
use crate::config::CustomerAuthConfig;

/// Optional parameters for the authorize request.
///
/// Unset values fall back to [`CustomerAuthConfig::default_prompt`] and
/// [`CustomerAuthConfig::default_locale`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizeOptions {
    /// The `prompt` parameter, e.g. `none` for a silent login attempt.
    pub prompt: Option<String>,
    /// The `locale` of the login page, e.g. `fr`.
    pub locale: Option<String>,
}

impl AuthorizeOptions {
    /// Sets `prompt`.
    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Sets `locale`.
    #[must_use]
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Result of starting a login.
///
/// # Important
///
/// `pending` **must** be saved (see [`PendingAuthorization::save`]) before
/// navigating to `url`. Without it the callback cannot be verified and the
/// code cannot be exchanged.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The full authorization URL to send the customer to.
    pub url: String,
    /// The values to keep until the callback.
    pub pending: PendingAuthorization,
}

/// Starts the Authorization Code flow with PKCE.
///
/// Generates a code verifier, its S256 challenge, a `state` and a `nonce`,
/// and returns the authorize URL together with the values to persist.
#[must_use]
pub fn begin_auth(config: &CustomerAuthConfig, options: &AuthorizeOptions) -> BeginAuthResult {
    let pkce = PkceParams::generate();
    let url = authorization_url(config, options, &pkce);
    BeginAuthResult {
        url,
        pending: PendingAuthorization::from(pkce),
    }
}

/// Builds the authorize URL for already generated PKCE parameters.
///
/// Pure; the same inputs always give the same URL.
#[must_use]
pub fn authorization_url(
    config: &CustomerAuthConfig,
    options: &AuthorizeOptions,
    pkce: &PkceParams,
) -> String {
    let mut params = vec![
        ("scope", config.scopes().to_string()),
        ("client_id", config.client_id().as_ref().to_string()),
        ("response_type", "code".to_string()),
        ("redirect_uri", config.redirect_uri().as_ref().to_string()),
        ("state", pkce.state.clone()),
        ("nonce", pkce.nonce.clone()),
        ("code_challenge", pkce.code_challenge.clone()),
        ("code_challenge_method", "S256".to_string()),
    ];

    let prompt = options.prompt.as_deref().or_else(|| config.default_prompt());
    if let Some(prompt) = prompt {
        params.push(("prompt", prompt.to_string()));
    }
    let locale = options.locale.as_deref().or_else(|| config.default_locale());
    if let Some(locale) = locale {
        params.push(("locale", locale.to_string()));
    }

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.authorize_endpoint(), query_string)
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};
