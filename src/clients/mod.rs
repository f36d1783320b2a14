//! HTTP client types for the identity provider, the Customer Account API and
//! the cookie API.
//!
//! # Overview
//!
//! - [`HttpClient`]: The async HTTP transport shared by every component
//! - [`HttpRequest`]: A request with an absolute URL and optional body
//! - [`HttpResponse`]: A response with parsed JSON body and raw text
//! - [`graphql::CustomerAccountClient`]: GraphQL client for the Customer Account API
//! - [`graphql::GraphqlError`]: GraphQL-specific error types
//!
//! # Retry Behavior
//!
//! Nothing in this crate retries automatically. Transient failures are
//! reported through [`HttpError::is_transient`] so the caller can decide.

mod errors;
pub mod graphql;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{user_agent, HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder, RequestBody};
pub use http_response::HttpResponse;

pub use graphql::{CustomerAccountClient, GraphqlError};
