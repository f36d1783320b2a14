//! Authentication of inbound requests by customer access token.
//!
//! A request is authenticated by asking the Customer Account API who the
//! token belongs to. There is no local token validation: a token is valid
//! exactly when the API answers with a customer.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use axum::{routing::get, Router};
//! use shopify_customer_auth::server::{AuthenticatedCustomer, AuthError, RequestAuthenticator};
//!
//! async fn order(
//!     customer: AuthenticatedCustomer,
//!     axum::extract::Path(id): axum::extract::Path<String>,
//! ) -> Result<String, AuthError> {
//!     let order = customer.verify_order_ownership(&id).await?;
//!     Ok(order.name)
//! }
//!
//! let authenticator = Arc::new(RequestAuthenticator::new(config)?);
//! let app: Router = Router::new()
//!     .route("/orders/{id}", get(order))
//!     .with_state(authenticator);
//! ```

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::header::AUTHORIZATION;
use http::request::Parts;
use http::{HeaderMap, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::auth::CustomerIdentity;
use crate::clients::graphql::CustomerOrder;
use crate::clients::{CustomerAccountClient, GraphqlError, HttpClient, HttpError};
use crate::config::CustomerAuthConfig;
use crate::server::cookies::{cookie_value, ACCESS_TOKEN_COOKIE};

/// Why a request was not authenticated or authorized.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token in the `Authorization` header or the access token cookie.
    #[error("No customer access token in request")]
    MissingToken,

    /// The Customer Account API did not accept the token.
    #[error("Customer access token was rejected: {reason}")]
    Unauthorized {
        /// What the API answered.
        reason: String,
    },

    /// The customer may not access the requested resource.
    #[error("Order '{order_id}' is not visible to the customer")]
    Forbidden {
        /// The requested order.
        order_id: String,
    },

    /// The Customer Account API could not be reached.
    #[error("Customer Account API unavailable: {0}")]
    Upstream(#[source] GraphqlError),
}

impl AuthError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::MissingToken | Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::Upstream(_) => "upstream_unavailable",
        }
    }

    fn from_identity_error(error: GraphqlError) -> Self {
        match error {
            GraphqlError::Network(_) => Self::Upstream(error),
            other => Self::Unauthorized {
                reason: other.to_string(),
            },
        }
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            Self::Upstream(_) => tracing::warn!("Request authentication failed: {self}"),
            _ => tracing::debug!("Request authentication failed: {self}"),
        }
        (self.status_code(), Json(json!({ "error": self.code() }))).into_response()
    }
}

/// Validates customer access tokens on inbound requests.
#[derive(Clone, Debug)]
pub struct RequestAuthenticator {
    config: CustomerAuthConfig,
    http: HttpClient,
}

impl RequestAuthenticator {
    /// Creates an authenticator with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the HTTP client cannot be created.
    pub fn new(config: CustomerAuthConfig) -> Result<Self, HttpError> {
        let http = HttpClient::new(&config)?;
        Ok(Self::with_http_client(config, http))
    }

    /// Creates an authenticator that shares an existing [`HttpClient`].
    #[must_use]
    pub const fn with_http_client(config: CustomerAuthConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    /// Returns the token carried by a request.
    ///
    /// The `Authorization` header wins over the access token cookie. A
    /// `Bearer ` prefix is accepted and removed.
    #[must_use]
    pub fn extract_token(headers: &HeaderMap) -> Option<String> {
        let from_header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                let value = value.trim();
                match value.get(..7) {
                    Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => value[7..].trim(),
                    _ => value,
                }
            })
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        from_header.or_else(|| cookie_value(headers, ACCESS_TOKEN_COOKIE))
    }

    /// Authenticates a request by its headers.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingToken`] when the request carries no token
    /// - [`AuthError::Unauthorized`] when the API rejects the token or
    ///   returns no customer
    /// - [`AuthError::Upstream`] when the API cannot be reached
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedCustomer, AuthError> {
        let token = Self::extract_token(headers).ok_or(AuthError::MissingToken)?;
        self.authenticate_token(token).await
    }

    /// Authenticates a bare access token.
    ///
    /// # Errors
    ///
    /// Same as [`authenticate`](Self::authenticate), minus `MissingToken`.
    pub async fn authenticate_token(
        &self,
        access_token: impl Into<String>,
    ) -> Result<AuthenticatedCustomer, AuthError> {
        let client =
            CustomerAccountClient::with_http_client(&self.config, self.http.clone(), access_token);
        let customer = client
            .customer()
            .await
            .map_err(AuthError::from_identity_error)?
            .ok_or_else(|| AuthError::Unauthorized {
                reason: "no customer for token".to_string(),
            })?;

        tracing::debug!(customer_id = %customer.id, "Request authenticated");
        Ok(AuthenticatedCustomer {
            customer_id: customer.id.clone(),
            customer,
            client,
        })
    }
}

/// A request whose token the Customer Account API accepted.
#[derive(Clone, Debug)]
pub struct AuthenticatedCustomer {
    /// Customer GID.
    pub customer_id: String,
    /// The identity returned by the API.
    pub customer: CustomerIdentity,
    /// A client acting as this customer.
    pub client: CustomerAccountClient,
}

impl AuthenticatedCustomer {
    /// Confirms that the customer can see `order_id` by querying it as the
    /// customer.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Forbidden`] if the order is not visible to the
    /// customer, or [`AuthError::Upstream`] if the API cannot be reached.
    pub async fn verify_order_ownership(&self, order_id: &str) -> Result<CustomerOrder, AuthError> {
        match self.client.order(order_id).await {
            Ok(Some(order)) => Ok(order),
            Ok(None) => Err(AuthError::Forbidden {
                order_id: order_id.to_string(),
            }),
            Err(e @ GraphqlError::Network(_)) => Err(AuthError::Upstream(e)),
            Err(e) => {
                tracing::debug!("Order lookup refused: {e}");
                Err(AuthError::Forbidden {
                    order_id: order_id.to_string(),
                })
            }
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedCustomer
where
    Arc<RequestAuthenticator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Arc::<RequestAuthenticator>::from_ref(state);
        authenticator.authenticate(&parts.headers).await
    }
}
