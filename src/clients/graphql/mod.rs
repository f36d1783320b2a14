//! GraphQL client for the Customer Account API.
//!
//! # Overview
//!
//! - [`CustomerAccountClient`]: executes operations with a customer's access token
//! - [`GraphqlError`]: every failure mode of a GraphQL call
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_customer_auth::CustomerAccountClient;
//! use serde_json::json;
//!
//! let client = CustomerAccountClient::new(&config, access_token)?;
//!
//! if let Some(customer) = client.customer().await? {
//!     println!("Signed in as {}", customer.display_name);
//! }
//!
//! let response = client.query(
//!     "query Orders($first: Int!) { customer { orders(first: $first) { nodes { id name } } } }",
//!     Some(json!({ "first": 5 })),
//!     Some("Orders"),
//! ).await?;
//! ```
//!
//! # Localization
//!
//! [`CustomerAccountClient::with_language`] adds an
//! `@inContext(language: ...)` directive to each outgoing operation.

mod client;
mod errors;
mod language;

pub use client::{
    CustomerAccountClient, CustomerOrder, GraphqlResponse, Money, CUSTOMER_IDENTITY_QUERY,
};
pub use errors::GraphqlError;
pub use language::{inject_language, normalize_language};
