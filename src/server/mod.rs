//! Server-side components.
//!
//! - [`cookie_proxy`]: the cookie API backing secure token storage
//! - [`cookies`]: session cookie encoding shared by the proxy and the authenticator
//! - [`RequestAuthenticator`]: validates customer tokens on inbound requests,
//!   with an axum extractor for [`AuthenticatedCustomer`]

mod authenticator;
pub mod cookie_proxy;
pub mod cookies;

pub use authenticator::{AuthError, AuthenticatedCustomer, RequestAuthenticator};
pub use cookie_proxy::CookieProxy;
