//! Configuration error types for the customer authentication core.
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use shopify_customer_auth::{ClientId, ConfigError};
//!
//! let result = ClientId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyClientId)));
//! ```

use thiserror::Error;

/// Errors that can occur while building a [`CustomerAuthConfig`](crate::CustomerAuthConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty. Please provide the Customer Account API client ID from the Headless or Hydrogen channel.")]
    EmptyClientId,

    /// Shop ID is invalid.
    #[error("Invalid shop ID '{shop_id}'. Expected the numeric shop identifier (e.g., '68817551676').")]
    InvalidShopId {
        /// The invalid shop ID that was provided.
        shop_id: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2025-01') or 'unstable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// A URL is invalid.
    #[error("Invalid {kind} '{url}'. Please provide an absolute http(s) URL (e.g., 'https://store.example.com/account/callback').")]
    InvalidUrl {
        /// Which setting the URL was provided for.
        kind: &'static str,
        /// The invalid URL that was provided.
        url: String,
    },

    /// Language code cannot be used for `@inContext` injection.
    #[error("Invalid language code '{code}'. Expected an ISO code such as 'en', 'fr' or 'pt-BR'.")]
    InvalidLanguage {
        /// The invalid language code.
        code: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_client_id_error_message() {
        let message = ConfigError::EmptyClientId.to_string();
        assert!(message.contains("Client ID cannot be empty"));
    }

    #[test]
    fn test_invalid_shop_id_error_message() {
        let error = ConfigError::InvalidShopId {
            shop_id: "my-store".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("my-store"));
        assert!(message.contains("numeric"));
    }

    #[test]
    fn test_invalid_url_names_the_setting() {
        let error = ConfigError::InvalidUrl {
            kind: "redirect URI",
            url: "not a url".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("redirect URI"));
        assert!(message.contains("not a url"));
    }

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField { field: "client_id" };
        let message = error.to_string();
        assert!(message.contains("client_id"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyClientId;
        let _: &dyn std::error::Error = &error;
    }
}
