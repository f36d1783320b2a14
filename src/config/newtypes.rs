//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use url::Url;

/// A validated Customer Account API client ID.
///
/// The client ID is public (it appears in the authorize URL), so unlike the
/// token types it is printed as-is in debug output.
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::ClientId;
///
/// let id = ClientId::new("shp_8f2e1c").unwrap();
/// assert_eq!(id.as_ref(), "shp_8f2e1c");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new validated client ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientId`] if the ID is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::EmptyClientId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated numeric Shopify shop identifier.
///
/// The Customer Account API addresses shops by numeric ID rather than by
/// `*.myshopify.com` domain. Passing a domain here is the most common
/// misconfiguration, and the token endpoint answers it with an HTTP 301.
///
/// # Serialization
///
/// ```rust
/// use shopify_customer_auth::ShopId;
///
/// let shop = ShopId::new("68817551676").unwrap();
/// let json = serde_json::to_string(&shop).unwrap();
/// assert_eq!(json, r#""68817551676""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopId(String);

impl ShopId {
    /// Creates a new validated shop ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopId`] unless the value is a non-empty
    /// string of ASCII digits.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into().trim().to_string();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidShopId { shop_id: id });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ShopId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ShopId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ShopId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

fn parse_http_url(raw: &str, kind: &'static str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        kind,
        url: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}

/// A validated absolute redirect URI registered with the Customer Account API.
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::RedirectUri;
///
/// let uri = RedirectUri::new("https://store.example.com/account/callback").unwrap();
/// assert_eq!(uri.origin(), "https://store.example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectUri(Url);

impl RedirectUri {
    /// Creates a new validated redirect URI.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the value is not an absolute
    /// `http` or `https` URL with a host.
    pub fn new(uri: impl AsRef<str>) -> Result<Self, ConfigError> {
        parse_http_url(uri.as_ref(), "redirect URI").map(Self)
    }

    /// Returns the `scheme://host[:port]` origin of the redirect URI.
    #[must_use]
    pub fn origin(&self) -> String {
        self.0.origin().ascii_serialization()
    }

    /// Returns the parsed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.0
    }
}

impl AsRef<str> for RedirectUri {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// The base URL of the identity provider and Customer Account API.
///
/// Defaults to `https://shopify.com`. Other values are useful for routing
/// requests through a mock server or an egress proxy.
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::ProviderUrl;
///
/// let provider = ProviderUrl::default();
/// assert_eq!(provider.join("/authentication/1/oauth/token"),
///     "https://shopify.com/authentication/1/oauth/token");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderUrl(String);

impl ProviderUrl {
    /// The production identity provider.
    pub const SHOPIFY: &'static str = "https://shopify.com";

    /// Creates a new validated provider URL. Any trailing slash is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the value is not an absolute
    /// `http` or `https` URL.
    pub fn new(url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let parsed = parse_http_url(url.as_ref(), "provider URL")?;
        Ok(Self(parsed.as_str().trim_end_matches('/').to_string()))
    }

    /// Appends an absolute path (starting with `/`) to the base URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{path}", self.0)
    }
}

impl Default for ProviderUrl {
    fn default() -> Self {
        Self(Self::SHOPIFY.to_string())
    }
}

impl AsRef<str> for ProviderUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
