//! GraphQL client implementation for the Customer Account API.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::customer::CustomerNode;
use crate::auth::CustomerIdentity;
use crate::clients::graphql::language::{inject_language, normalize_language};
use crate::clients::graphql::GraphqlError;
use crate::clients::{HttpClient, HttpMethod, HttpRequest, RequestBody};
use crate::config::{ApiVersion, CustomerAuthConfig};
use crate::error::ConfigError;

/// The "who am I" query used to resolve the token's customer.
pub const CUSTOMER_IDENTITY_QUERY: &str = "query CustomerIdentity { customer { id displayName firstName lastName emailAddress { emailAddress } } }";

const ORDER_QUERY: &str = "query CustomerOrder($id: ID!) { order(id: $id) { id name processedAt financialStatus totalPrice { amount currencyCode } } }";

/// A successful GraphQL response.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphqlResponse {
    /// The `data` field.
    pub data: serde_json::Value,
    /// The `extensions` field, if present.
    pub extensions: Option<serde_json::Value>,
}

/// A monetary amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as a string.
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

/// An order as seen by the customer who placed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    /// Order GID.
    pub id: String,
    /// Order name (e.g. `#1001`).
    pub name: String,
    /// When the order was processed.
    pub processed_at: Option<String>,
    /// Financial status.
    pub financial_status: Option<String>,
    /// Order total.
    pub total_price: Option<Money>,
}

/// GraphQL client for the Customer Account API.
///
/// Requests go to `{provider}/{shop_id}/account/customer/api/{version}/graphql`
/// with the raw access token in the `Authorization` header. The Customer
/// Account API does not accept a `Bearer ` prefix here.
///
/// # Thread Safety
///
/// `CustomerAccountClient` is `Clone`, `Send` and `Sync`.
///
/// # Example
///
/// ```rust,ignore
/// use shopify_customer_auth::CustomerAccountClient;
///
/// let client = CustomerAccountClient::new(&config, access_token)?.with_language("fr")?;
/// let response = client
///     .query("query { customer { firstName } }", None, None)
///     .await?;
/// println!("{}", response.data["customer"]["firstName"]);
/// ```
#[derive(Clone)]
pub struct CustomerAccountClient {
    http_client: HttpClient,
    endpoint: String,
    api_version: ApiVersion,
    access_token: String,
    language: Option<String>,
}

impl fmt::Debug for CustomerAccountClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerAccountClient")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("access_token", &"*****")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CustomerAccountClient>();
};

impl CustomerAccountClient {
    /// Creates a new client for the given access token.
    ///
    /// # Errors
    ///
    /// Returns [`GraphqlError::Network`] if the HTTP client cannot be created.
    pub fn new(
        config: &CustomerAuthConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, GraphqlError> {
        let http_client = HttpClient::new(config)?;
        Ok(Self::with_http_client(config, http_client, access_token))
    }

    /// Creates a new client that shares an existing [`HttpClient`].
    #[must_use]
    pub fn with_http_client(
        config: &CustomerAuthConfig,
        http_client: HttpClient,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            endpoint: config.graphql_endpoint(),
            api_version: config.api_version().clone(),
            access_token: access_token.into(),
            language: None,
        }
    }

    /// Localizes responses by injecting `@inContext(language: ...)` into
    /// every query sent by this client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLanguage`] for codes that are not
    /// language or locale identifiers.
    pub fn with_language(mut self, code: &str) -> Result<Self, ConfigError> {
        self.language = Some(normalize_language(code)?);
        Ok(self)
    }

    /// Returns the API version being used by this client.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the normalized language code, if set.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Executes a GraphQL operation.
    ///
    /// # Errors
    ///
    /// - [`GraphqlError::Http`] for non-2xx responses
    /// - [`GraphqlError::Graphql`] when the response has an `errors` array
    /// - [`GraphqlError::Network`] when no response was received
    /// - [`GraphqlError::InvalidResponse`] when the body is not a GraphQL payload
    pub async fn query(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
        operation_name: Option<&str>,
    ) -> Result<GraphqlResponse, GraphqlError> {
        let query = match &self.language {
            Some(language) => inject_language(query, language),
            None => query.to_string(),
        };

        let mut body = json!({ "query": query });
        if let Some(variables) = variables {
            body["variables"] = variables;
        }
        if let Some(name) = operation_name {
            body["operationName"] = json!(name);
        }

        let request = HttpRequest::builder(HttpMethod::Post, &self.endpoint)
            .body(RequestBody::Json(body))
            .header("Authorization", &self.access_token)
            .build()
            .map_err(crate::clients::HttpError::from)?;

        let response = self.http_client.request(request).await?;

        if !response.is_ok() {
            tracing::debug!(
                status = response.code,
                request_id = response.request_id(),
                "Customer Account API request failed"
            );
            return Err(GraphqlError::from_status(response.code, response.text));
        }

        let serde_json::Value::Object(mut payload) = response.body else {
            return Err(GraphqlError::InvalidResponse {
                reason: "response body is not a JSON object".to_string(),
            });
        };

        let extensions = payload.remove("extensions");
        match payload.remove("errors") {
            Some(serde_json::Value::Array(errors)) if !errors.is_empty() => {
                return Err(GraphqlError::from_errors(errors, extensions));
            }
            _ => {}
        }

        let data = payload
            .remove("data")
            .ok_or_else(|| GraphqlError::InvalidResponse {
                reason: "response has neither data nor errors".to_string(),
            })?;

        Ok(GraphqlResponse { data, extensions })
    }

    /// Executes a GraphQL operation and deserializes its `data` field.
    ///
    /// # Errors
    ///
    /// Same as [`query`](Self::query), plus [`GraphqlError::InvalidResponse`]
    /// when `data` does not match `T`.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
        operation_name: Option<&str>,
    ) -> Result<T, GraphqlError> {
        let response = self.query(query, variables, operation_name).await?;
        serde_json::from_value(response.data).map_err(|e| GraphqlError::InvalidResponse {
            reason: e.to_string(),
        })
    }

    /// Fetches the customer that owns the access token.
    ///
    /// Returns `Ok(None)` when the API answers with a null customer.
    ///
    /// # Errors
    ///
    /// Same as [`query_as`](Self::query_as).
    pub async fn customer(&self) -> Result<Option<CustomerIdentity>, GraphqlError> {
        #[derive(Deserialize)]
        struct Data {
            customer: Option<CustomerNode>,
        }

        let data: Data = self
            .query_as(CUSTOMER_IDENTITY_QUERY, None, Some("CustomerIdentity"))
            .await?;
        Ok(data.customer.map(CustomerIdentity::from))
    }

    /// Fetches an order as the token's customer.
    ///
    /// `order_id` may be a GID or a bare numeric ID. Orders that belong to
    /// another customer come back as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Same as [`query_as`](Self::query_as).
    pub async fn order(&self, order_id: &str) -> Result<Option<CustomerOrder>, GraphqlError> {
        #[derive(Deserialize)]
        struct Data {
            order: Option<CustomerOrder>,
        }

        let data: Data = self
            .query_as(
                ORDER_QUERY,
                Some(json!({ "id": order_gid(order_id) })),
                Some("CustomerOrder"),
            )
            .await?;
        Ok(data.order)
    }
}

fn order_gid(order_id: &str) -> String {
    let order_id = order_id.trim();
    if order_id.starts_with("gid://") {
        order_id.to_string()
    } else {
        format!("gid://shopify/Order/{order_id}")
    }
}
