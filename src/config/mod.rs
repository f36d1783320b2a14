//! Configuration types for customer authentication.
//!
//! # Overview
//!
//! - [`CustomerAuthConfig`]: All settings for the login flow, token storage and
//!   the Customer Account API client
//! - [`CustomerAuthConfigBuilder`]: A builder for constructing [`CustomerAuthConfig`]
//! - [`Environment`]: Selects the default token storage mode
//! - [`ClientId`], [`ShopId`], [`RedirectUri`], [`ProviderUrl`]: validated newtypes
//! - [`ApiVersion`]: The Customer Account API version to use
//!
//! # Example
//!
//! ```rust
//! use shopify_customer_auth::{ClientId, CustomerAuthConfig, Environment, RedirectUri, ShopId};
//!
//! let config = CustomerAuthConfig::builder()
//!     .client_id(ClientId::new("shp_8f2e1c").unwrap())
//!     .shop_id(ShopId::new("68817551676").unwrap())
//!     .redirect_uri(RedirectUri::new("http://localhost:3000/callback").unwrap())
//!     .environment(Environment::Development)
//!     .build()
//!     .unwrap();
//!
//! assert!(!config.use_secure_cookies());
//! ```

mod newtypes;
mod version;

pub use newtypes::{ClientId, ProviderUrl, RedirectUri, ShopId};
pub use version::ApiVersion;

use crate::auth::AuthScopes;
use crate::error::ConfigError;
use std::time::Duration;

/// Default safety window before access-token expiry that triggers a refresh.
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::from_secs(300);

/// Default timeout for calls to the cookie API.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Deployment environment.
///
/// `Production` stores tokens in httpOnly cookies through the cookie API.
/// `Development` keeps them in a client-side key/value store, unencrypted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    /// Secure cookie storage.
    #[default]
    Production,
    /// Local, unencrypted storage.
    Development,
}

/// Configuration for customer authentication.
///
/// `CustomerAuthConfig` is `Clone`, `Send`, and `Sync`. It carries no global
/// state; every component takes a reference to the instance it should use.
///
/// # Storage mode
///
/// [`use_secure_cookies`](Self::use_secure_cookies) is the single switch for
/// token storage. It follows [`Environment`] unless overridden with
/// [`CustomerAuthConfigBuilder::use_secure_cookies`]. When it is on, a cookie
/// API URL is required.
#[derive(Clone, Debug)]
pub struct CustomerAuthConfig {
    client_id: ClientId,
    shop_id: ShopId,
    redirect_uri: RedirectUri,
    scopes: AuthScopes,
    api_version: ApiVersion,
    provider_url: ProviderUrl,
    environment: Environment,
    use_secure_cookies: bool,
    cookie_api_url: Option<String>,
    origin: Option<String>,
    user_agent_prefix: Option<String>,
    refresh_buffer: Duration,
    storage_timeout: Duration,
    post_logout_redirect_uri: Option<RedirectUri>,
    default_locale: Option<String>,
    default_prompt: Option<String>,
}

impl CustomerAuthConfig {
    /// Creates a new builder for constructing a `CustomerAuthConfig`.
    #[must_use]
    pub fn builder() -> CustomerAuthConfigBuilder {
        CustomerAuthConfigBuilder::new()
    }

    /// Returns the Customer Account API client ID.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the numeric shop ID.
    #[must_use]
    pub const fn shop_id(&self) -> &ShopId {
        &self.shop_id
    }

    /// Returns the OAuth redirect URI.
    #[must_use]
    pub const fn redirect_uri(&self) -> &RedirectUri {
        &self.redirect_uri
    }

    /// Returns the requested scopes.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the Customer Account API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the identity provider base URL.
    #[must_use]
    pub const fn provider_url(&self) -> &ProviderUrl {
        &self.provider_url
    }

    /// Returns the deployment environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns `true` when tokens are stored in httpOnly cookies.
    #[must_use]
    pub const fn use_secure_cookies(&self) -> bool {
        self.use_secure_cookies
    }

    /// Returns the cookie API base URL, without a trailing slash.
    #[must_use]
    pub fn cookie_api_url(&self) -> Option<&str> {
        self.cookie_api_url.as_deref()
    }

    /// Returns the browser origin sent with token requests, if configured.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns how long before expiry a token is treated as expired.
    #[must_use]
    pub const fn refresh_buffer(&self) -> Duration {
        self.refresh_buffer
    }

    /// Returns the timeout applied to cookie API calls.
    #[must_use]
    pub const fn storage_timeout(&self) -> Duration {
        self.storage_timeout
    }

    /// Returns where the provider sends the customer after logout.
    ///
    /// Falls back to the redirect URI.
    #[must_use]
    pub fn post_logout_redirect_uri(&self) -> &RedirectUri {
        self.post_logout_redirect_uri
            .as_ref()
            .unwrap_or(&self.redirect_uri)
    }

    /// Returns the default `locale` for the login page, if configured.
    #[must_use]
    pub fn default_locale(&self) -> Option<&str> {
        self.default_locale.as_deref()
    }

    /// Returns the default `prompt` for the authorize request, if configured.
    #[must_use]
    pub fn default_prompt(&self) -> Option<&str> {
        self.default_prompt.as_deref()
    }

    pub(crate) fn authorize_endpoint(&self) -> String {
        self.provider_url
            .join(&format!("/authentication/{}/oauth/authorize", self.shop_id))
    }

    pub(crate) fn token_endpoint(&self) -> String {
        self.provider_url
            .join(&format!("/authentication/{}/oauth/token", self.shop_id))
    }

    pub(crate) fn logout_endpoint(&self) -> String {
        self.provider_url
            .join(&format!("/authentication/{}/logout", self.shop_id))
    }

    pub(crate) fn graphql_endpoint(&self) -> String {
        self.provider_url.join(&format!(
            "/{}/account/customer/api/{}/graphql",
            self.shop_id, self.api_version
        ))
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CustomerAuthConfig>();
};

/// Builder for constructing [`CustomerAuthConfig`] instances.
///
/// Required fields are `client_id`, `shop_id` and `redirect_uri`, plus
/// `cookie_api_url` whenever secure cookies are in use.
///
/// # Defaults
///
/// - `scopes`: `openid email customer-account-api:full`
/// - `api_version`: Latest stable version
/// - `provider_url`: `https://shopify.com`
/// - `environment`: [`Environment::Production`]
/// - `refresh_buffer`: 300 seconds
/// - `storage_timeout`: 5 seconds
/// - `post_logout_redirect_uri`: the redirect URI
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::{
///     ApiVersion, ClientId, CustomerAuthConfig, RedirectUri, ShopId,
/// };
///
/// let config = CustomerAuthConfig::builder()
///     .client_id(ClientId::new("shp_8f2e1c").unwrap())
///     .shop_id(ShopId::new("68817551676").unwrap())
///     .redirect_uri(RedirectUri::new("https://store.example.com/account/callback").unwrap())
///     .cookie_api_url("https://store.example.com/api/auth")
///     .origin("https://store.example.com")
///     .api_version(ApiVersion::V2025_01)
///     .user_agent_prefix("Storefront/1.0")
///     .build()
///     .unwrap();
///
/// assert!(config.use_secure_cookies());
/// ```
#[derive(Debug, Default)]
pub struct CustomerAuthConfigBuilder {
    client_id: Option<ClientId>,
    shop_id: Option<ShopId>,
    redirect_uri: Option<RedirectUri>,
    scopes: Option<AuthScopes>,
    api_version: Option<ApiVersion>,
    provider_url: Option<ProviderUrl>,
    environment: Option<Environment>,
    use_secure_cookies: Option<bool>,
    cookie_api_url: Option<String>,
    origin: Option<String>,
    user_agent_prefix: Option<String>,
    refresh_buffer: Option<Duration>,
    storage_timeout: Option<Duration>,
    post_logout_redirect_uri: Option<RedirectUri>,
    default_locale: Option<String>,
    default_prompt: Option<String>,
}

impl CustomerAuthConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the client ID (required).
    #[must_use]
    pub fn client_id(mut self, id: ClientId) -> Self {
        self.client_id = Some(id);
        self
    }

    /// Sets the shop ID (required).
    #[must_use]
    pub fn shop_id(mut self, id: ShopId) -> Self {
        self.shop_id = Some(id);
        self
    }

    /// Sets the redirect URI (required).
    #[must_use]
    pub fn redirect_uri(mut self, uri: RedirectUri) -> Self {
        self.redirect_uri = Some(uri);
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the identity provider base URL.
    #[must_use]
    pub fn provider_url(mut self, url: ProviderUrl) -> Self {
        self.provider_url = Some(url);
        self
    }

    /// Sets the deployment environment.
    #[must_use]
    pub const fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Overrides the storage mode chosen by the environment.
    #[must_use]
    pub const fn use_secure_cookies(mut self, enabled: bool) -> Self {
        self.use_secure_cookies = Some(enabled);
        self
    }

    /// Sets the base URL of the cookie API (e.g. `https://store.example.com/api/auth`).
    #[must_use]
    pub fn cookie_api_url(mut self, url: impl Into<String>) -> Self {
        self.cookie_api_url = Some(url.into());
        self
    }

    /// Sets the browser origin sent as the `Origin` header on token requests.
    ///
    /// Public clients registered for a browser origin are rejected with
    /// `invalid_token` when the header is missing.
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the refresh safety buffer.
    #[must_use]
    pub const fn refresh_buffer(mut self, buffer: Duration) -> Self {
        self.refresh_buffer = Some(buffer);
        self
    }

    /// Sets the cookie API timeout.
    #[must_use]
    pub const fn storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = Some(timeout);
        self
    }

    /// Sets where the provider redirects after logout.
    #[must_use]
    pub fn post_logout_redirect_uri(mut self, uri: RedirectUri) -> Self {
        self.post_logout_redirect_uri = Some(uri);
        self
    }

    /// Sets the default login page locale (e.g. `fr`).
    #[must_use]
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    /// Sets the default `prompt` value (e.g. `login` or `none`).
    #[must_use]
    pub fn default_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_prompt = Some(prompt.into());
        self
    }

    /// Builds the [`CustomerAuthConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `client_id`, `shop_id`
    /// or `redirect_uri` are not set, or if secure cookies are on without a
    /// `cookie_api_url`. Returns [`ConfigError::InvalidUrl`] for a malformed
    /// cookie API URL or origin.
    pub fn build(self) -> Result<CustomerAuthConfig, ConfigError> {
        let client_id = self
            .client_id
            .ok_or(ConfigError::MissingRequiredField { field: "client_id" })?;
        let shop_id = self
            .shop_id
            .ok_or(ConfigError::MissingRequiredField { field: "shop_id" })?;
        let redirect_uri = self.redirect_uri.ok_or(ConfigError::MissingRequiredField {
            field: "redirect_uri",
        })?;

        let environment = self.environment.unwrap_or_default();
        let use_secure_cookies = self
            .use_secure_cookies
            .unwrap_or(environment == Environment::Production);

        let cookie_api_url = self
            .cookie_api_url
            .map(|raw| {
                ProviderUrl::new(&raw)
                    .map(|url| url.as_ref().to_string())
                    .map_err(|_| ConfigError::InvalidUrl {
                        kind: "cookie API URL",
                        url: raw,
                    })
            })
            .transpose()?;
        if use_secure_cookies && cookie_api_url.is_none() {
            return Err(ConfigError::MissingRequiredField {
                field: "cookie_api_url",
            });
        }

        let origin = self
            .origin
            .map(|raw| {
                RedirectUri::new(&raw)
                    .map(|uri| uri.origin())
                    .map_err(|_| ConfigError::InvalidUrl {
                        kind: "origin",
                        url: raw,
                    })
            })
            .transpose()?;

        Ok(CustomerAuthConfig {
            client_id,
            shop_id,
            redirect_uri,
            scopes: self.scopes.unwrap_or_default(),
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            provider_url: self.provider_url.unwrap_or_default(),
            environment,
            use_secure_cookies,
            cookie_api_url,
            origin,
            user_agent_prefix: self.user_agent_prefix,
            refresh_buffer: self.refresh_buffer.unwrap_or(DEFAULT_REFRESH_BUFFER),
            storage_timeout: self.storage_timeout.unwrap_or(DEFAULT_STORAGE_TIMEOUT),
            post_logout_redirect_uri: self.post_logout_redirect_uri,
            default_locale: self.default_locale,
            default_prompt: self.default_prompt,
        })
    }
}
