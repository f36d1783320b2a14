//! OAuth scope handling for the Customer Account API.
//!
//! This module provides the [`AuthScopes`] type for the space-separated scope
//! list sent on the authorize request.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A set of OAuth scopes requested during customer login.
///
/// Scopes are kept in the order they were given and deduplicated. The wire
/// format is a single space-separated string, which is what both the
/// authorize URL and the token endpoint's `scope` field use.
///
/// The default set is `openid email customer-account-api:full`.
///
/// # Serialization
///
/// ```rust
/// use shopify_customer_auth::AuthScopes;
///
/// let scopes: AuthScopes = "openid email".parse().unwrap();
/// let json = serde_json::to_string(&scopes).unwrap();
/// assert_eq!(json, r#""openid email""#);
/// ```
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::AuthScopes;
///
/// let scopes = AuthScopes::default();
/// assert!(scopes.contains("openid"));
/// assert!(scopes.contains("customer-account-api:full"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthScopes {
    scopes: Vec<String>,
}

impl AuthScopes {
    /// The scope string requested when none is configured.
    pub const DEFAULT: &'static str = "openid email customer-account-api:full";

    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns `true` if `scope` is part of this set.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Returns `true` if this scope set contains every scope in `other`.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.iter().all(|s| self.contains(s))
    }

    /// Returns an iterator over the scopes in request order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn is_valid_scope(scope: &str) -> bool {
        scope
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))
    }
}

impl Default for AuthScopes {
    fn default() -> Self {
        Self {
            scopes: Self::DEFAULT.split(' ').map(str::to_string).collect(),
        }
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes: Vec<String> = Vec::new();

        // Commas are tolerated so values copied from admin scopes still parse.
        for scope in s.split(|c: char| c.is_whitespace() || c == ',') {
            if scope.is_empty() {
                continue;
            }
            if !Self::is_valid_scope(scope) {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }
            if !scopes.iter().any(|s| s == scope) {
                scopes.push(scope.to_string());
            }
        }

        if scopes.is_empty() {
            return Err(ConfigError::InvalidScopes {
                reason: "At least one scope is required (e.g., 'openid email')".to_string(),
            });
        }

        Ok(Self { scopes })
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(" "))
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
