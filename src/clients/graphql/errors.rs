//! GraphQL-specific error types for the Customer Account API client.
//!
//! Every failure mode of a GraphQL call surfaces through [`GraphqlError`]:
//!
//! - [`GraphqlError::Http`]: a non-2xx response
//! - [`GraphqlError::Graphql`]: an `errors` array in an otherwise successful response
//! - [`GraphqlError::Network`]: the request never produced a response
//! - [`GraphqlError::InvalidResponse`]: a 2xx response that is not a GraphQL payload
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_customer_auth::clients::graphql::GraphqlError;
//!
//! match client.query("query { customer { id } }", None, None).await {
//!     Ok(response) => println!("{}", response.data),
//!     Err(GraphqlError::Graphql { errors, .. }) => println!("{} errors", errors.len()),
//!     Err(e) => println!("{e}"),
//! }
//! ```

use crate::clients::HttpError;
use thiserror::Error;

/// Error type for Customer Account API operations.
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::clients::graphql::GraphqlError;
/// use serde_json::json;
///
/// let error = GraphqlError::from_errors(
///     vec![json!({"message": "Field 'foo' doesn't exist"}), json!({"message": "Access denied"})],
///     None,
/// );
/// assert!(error.to_string().contains("Field 'foo' doesn't exist"));
/// assert!(error.to_string().contains("Access denied"));
/// ```
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// A human-readable summary.
        message: String,
        /// The raw response body.
        body: String,
    },

    /// The response carried a GraphQL `errors` array.
    #[error("{message}")]
    Graphql {
        /// Every error message, joined.
        message: String,
        /// The original `errors` array.
        errors: Vec<serde_json::Value>,
        /// The response `extensions`, if present.
        extensions: Option<serde_json::Value>,
    },

    /// The request failed before a response was received.
    #[error(transparent)]
    Network(#[from] HttpError),

    /// The response could not be interpreted as GraphQL.
    #[error("Invalid GraphQL response: {reason}")]
    InvalidResponse {
        /// What was wrong with the response.
        reason: String,
    },
}

impl GraphqlError {
    /// Builds an [`GraphqlError::Http`] for a non-2xx status.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        let message = match status {
            401 => "Customer Account API rejected the access token (HTTP 401)".to_string(),
            403 => "Customer Account API denied access (HTTP 403)".to_string(),
            500 => "Customer Account API returned HTTP 500. Verify the access token shape: \
                    it must be the raw token from the token endpoint, without a 'Bearer ' prefix"
                .to_string(),
            _ => format!("Customer Account API request failed with HTTP {status}"),
        };
        Self::Http {
            status,
            message,
            body,
        }
    }

    /// Builds a [`GraphqlError::Graphql`] from an `errors` array.
    #[must_use]
    pub fn from_errors(
        errors: Vec<serde_json::Value>,
        extensions: Option<serde_json::Value>,
    ) -> Self {
        let messages: Vec<&str> = errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("Unknown GraphQL error")
            })
            .collect();
        let message = format!("GraphQL request failed: {}", messages.join("; "));
        Self::Graphql {
            message,
            errors,
            extensions,
        }
    }

    /// Returns `true` when the failure means the token is not accepted.
    ///
    /// Covers HTTP 401/403 and GraphQL errors whose `extensions.code` is
    /// `UNAUTHORIZED` or `ACCESS_DENIED`.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 401 | 403),
            Self::Graphql { errors, .. } => errors.iter().any(|e| {
                matches!(
                    e.pointer("/extensions/code").and_then(serde_json::Value::as_str),
                    Some("UNAUTHORIZED" | "ACCESS_DENIED")
                )
            }),
            Self::Network(_) | Self::InvalidResponse { .. } => false,
        }
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlError>();
};
