//! Token endpoint transport shared by the exchange and refresh grants.
//!
//! Both grants post a form to `{provider}/authentication/{shop_id}/oauth/token`
//! and get the same response shape back, so the request and its error
//! classification live here once. [`TokenGrant`] carries the grant-specific
//! fields.

use std::fmt;

use serde::Deserialize;

use crate::auth::oauth::OAuthError;
use crate::auth::TokenResponse;
use crate::clients::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::config::CustomerAuthConfig;

/// OAuth grant types used against the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantType {
    /// `authorization_code`
    AuthorizationCode,
    /// `refresh_token`
    RefreshToken,
}

impl GrantType {
    /// Returns the `grant_type` form value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grant presented to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// Exchange an authorization code, proving possession of the PKCE verifier.
    AuthorizationCode {
        /// The code from the callback.
        code: String,
        /// The verifier whose challenge was sent on the authorize request.
        code_verifier: String,
    },
    /// Trade a refresh token for a new access token.
    RefreshToken {
        /// The current refresh token.
        refresh_token: String,
    },
}

impl TokenGrant {
    /// Returns the grant type.
    #[must_use]
    pub const fn grant_type(&self) -> GrantType {
        match self {
            Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Self::RefreshToken { .. } => GrantType::RefreshToken,
        }
    }

    /// Returns the form fields for this grant, in wire order.
    #[must_use]
    pub fn form_params(&self, config: &CustomerAuthConfig) -> Vec<(String, String)> {
        let mut params = vec![
            ("grant_type".to_string(), self.grant_type().to_string()),
            ("client_id".to_string(), config.client_id().as_ref().to_string()),
        ];
        match self {
            Self::AuthorizationCode {
                code,
                code_verifier,
            } => {
                params.push((
                    "redirect_uri".to_string(),
                    config.redirect_uri().as_ref().to_string(),
                ));
                params.push(("code".to_string(), code.clone()));
                params.push(("code_verifier".to_string(), code_verifier.clone()));
            }
            Self::RefreshToken { refresh_token } => {
                params.push(("refresh_token".to_string(), refresh_token.clone()));
            }
        }
        params
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthorizationCode { .. } => f
                .debug_struct("AuthorizationCode")
                .field("code", &"*****")
                .field("code_verifier", &"*****")
                .finish(),
            Self::RefreshToken { .. } => f
                .debug_struct("RefreshToken")
                .field("refresh_token", &"*****")
                .finish(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Posts `grant` to the token endpoint.
///
/// # Errors
///
/// | Response | Error |
/// |---|---|
/// | HTTP 301 | [`OAuthError::InvalidShopId`] |
/// | `invalid_grant` | [`OAuthError::InvalidGrant`] |
/// | `invalid_client` | [`OAuthError::InvalidClient`] |
/// | `invalid_token` | [`OAuthError::MissingOrigin`] |
/// | HTTP 403 | [`OAuthError::MissingUserAgent`] |
/// | other non-2xx | [`OAuthError::TokenRequestFailed`] |
/// | unparseable 2xx | [`OAuthError::InvalidTokenResponse`] |
/// | no response | [`OAuthError::HttpError`] |
pub async fn request_tokens(
    http: &HttpClient,
    config: &CustomerAuthConfig,
    grant: &TokenGrant,
) -> Result<TokenResponse, OAuthError> {
    let mut builder = HttpRequest::builder(HttpMethod::Post, config.token_endpoint())
        .body(RequestBody::Form(grant.form_params(config)));
    if let Some(origin) = config.origin() {
        builder = builder.header("Origin", origin);
    }
    let request = builder.build().map_err(crate::clients::HttpError::from)?;

    tracing::debug!(grant_type = %grant.grant_type(), "Requesting tokens");
    let response = http.request(request).await?;

    if !response.is_ok() {
        let error = classify_error(&response, grant.grant_type(), config);
        tracing::warn!(
            grant_type = %grant.grant_type(),
            status = response.code,
            request_id = response.request_id(),
            "Token request failed: {error}"
        );
        return Err(error);
    }

    serde_json::from_str::<TokenResponse>(&response.text).map_err(|e| {
        OAuthError::InvalidTokenResponse {
            reason: e.to_string(),
        }
    })
}

fn classify_error(
    response: &HttpResponse,
    grant_type: GrantType,
    config: &CustomerAuthConfig,
) -> OAuthError {
    if response.code == 301 {
        return OAuthError::InvalidShopId {
            shop_id: config.shop_id().to_string(),
        };
    }

    let body: TokenErrorResponse = serde_json::from_str(&response.text).unwrap_or_default();
    let description = body.error_description.clone().unwrap_or_default();

    match (response.code, body.error.as_deref()) {
        (_, Some("invalid_grant")) => OAuthError::InvalidGrant {
            grant_type,
            description,
        },
        (_, Some("invalid_client")) => OAuthError::InvalidClient { description },
        (_, Some("invalid_token")) => OAuthError::MissingOrigin,
        (403, _) => OAuthError::MissingUserAgent,
        (status, error) => {
            let message = match (error, body.error_description.as_deref()) {
                (Some(error), Some(desc)) => format!("{error} - {desc}"),
                (Some(error), None) => error.to_string(),
                (None, _) if !response.text.is_empty() => response.text.clone(),
                (None, _) => "empty response body".to_string(),
            };
            OAuthError::TokenRequestFailed { status, message }
        }
    }
}
