//! ID token claims.
//!
//! The ID token is decoded **without** verifying its signature. The claims
//! are informational: they bind the callback to the login request through
//! `nonce` and give the provider a logout hint. Nothing here may be used to
//! decide who the customer is; identity always comes from the Customer
//! Account API.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::auth::oauth::OAuthError;

/// Claims read from an OpenID Connect ID token.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer.
    #[serde(default)]
    pub iss: Option<String>,
    /// Subject, the provider's customer identifier.
    #[serde(default)]
    pub sub: Option<String>,
    /// Audience, a single client ID or a list of them.
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    /// Expiration (Unix seconds).
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued at (Unix seconds).
    #[serde(default)]
    pub iat: Option<i64>,
    /// The nonce sent on the authorize request.
    #[serde(default)]
    pub nonce: Option<String>,
    /// Provider session ID.
    #[serde(default)]
    pub sid: Option<String>,
    /// Customer email, when the `email` scope was granted.
    #[serde(default)]
    pub email: Option<String>,
}

impl IdTokenClaims {
    /// Decodes the claims of `token` without checking its signature, expiry
    /// or audience.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidIdToken`] if the token is not a
    /// well-formed JWT.
    pub fn decode_unverified(token: &str) -> Result<Self, OAuthError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<Self>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| OAuthError::InvalidIdToken {
                reason: e.to_string(),
            })
    }

    /// Returns `true` if the `nonce` claim equals `expected`.
    #[must_use]
    pub fn nonce_matches(&self, expected: &str) -> bool {
        self.nonce.as_deref() == Some(expected)
    }
}
