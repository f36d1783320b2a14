//! Parsing of the provider's redirect back to the storefront.

use serde::Deserialize;
use url::Url;

use crate::auth::oauth::OAuthError;

/// Query parameters of the authorization callback.
///
/// Either `code` and `state` are present, or the provider reports an `error`
/// (for example `access_denied`, or `login_required` after `prompt=none`).
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::auth::oauth::AuthCallback;
///
/// let callback = AuthCallback::from_url(
///     "https://store.example.com/callback?code=abc&state=xyz",
/// ).unwrap();
/// assert_eq!(callback.code.as_deref(), Some("abc"));
/// assert_eq!(callback.state.as_deref(), Some("xyz"));
/// assert!(callback.error.is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AuthCallback {
    /// The authorization code.
    #[serde(default)]
    pub code: Option<String>,
    /// The `state` echoed back by the provider.
    #[serde(default)]
    pub state: Option<String>,
    /// The provider's error code.
    #[serde(default)]
    pub error: Option<String>,
    /// The provider's error description.
    #[serde(default)]
    pub error_description: Option<String>,
}

impl AuthCallback {
    /// Parses the callback from the full redirect URL.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidCallback`] if `url` is not an absolute URL.
    pub fn from_url(url: &str) -> Result<Self, OAuthError> {
        let parsed = Url::parse(url).map_err(|e| OAuthError::InvalidCallback {
            reason: e.to_string(),
        })?;
        Ok(Self::from_pairs(parsed.query_pairs()))
    }

    /// Parses the callback from a query string, with or without the leading `?`.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    fn from_pairs<'a>(
        pairs: impl Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    ) -> Self {
        let mut callback = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "code" => &mut callback.code,
                "state" => &mut callback.state,
                "error" => &mut callback.error,
                "error_description" => &mut callback.error_description,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }
        callback
    }
}
