//! Provider logout URL.

use crate::config::CustomerAuthConfig;

/// Builds `{provider}/authentication/{shop_id}/logout`.
///
/// `id_token_hint` is included when an ID token is available; the provider
/// needs it to end its own session without prompting. The customer is sent
/// back to [`CustomerAuthConfig::post_logout_redirect_uri`].
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::{ClientId, CustomerAuthConfig, Environment, RedirectUri, ShopId};
/// use shopify_customer_auth::auth::oauth::build_logout_url;
///
/// let config = CustomerAuthConfig::builder()
///     .client_id(ClientId::new("c").unwrap())
///     .shop_id(ShopId::new("12345").unwrap())
///     .redirect_uri(RedirectUri::new("http://localhost:3000/callback").unwrap())
///     .environment(Environment::Development)
///     .build()
///     .unwrap();
///
/// let url = build_logout_url(&config, Some("eyJhbGciOi"));
/// assert!(url.starts_with("https://shopify.com/authentication/12345/logout?id_token_hint=eyJhbGciOi"));
/// ```
#[must_use]
pub fn build_logout_url(config: &CustomerAuthConfig, id_token: Option<&str>) -> String {
    let mut params = Vec::with_capacity(2);
    if let Some(id_token) = id_token {
        params.push(("id_token_hint", id_token));
    }
    params.push((
        "post_logout_redirect_uri",
        config.post_logout_redirect_uri().as_ref(),
    ));

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.logout_endpoint(), query_string)
}
