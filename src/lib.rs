//! # Shopify Customer Account Authentication
//!
//! Customer login for headless Shopify storefronts, built on the Customer
//! Account API's OAuth 2.0 Authorization Code flow with PKCE.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`CustomerAuthConfig`] and [`CustomerAuthConfigBuilder`]
//! - PKCE generation, authorize and logout URLs, code exchange and token
//!   refresh via [`auth::oauth`]
//! - Token storage in httpOnly cookies (production) or a local key/value
//!   store (development) via [`storage`]
//! - Login, lazy single-flight refresh and logout via [`SessionManager`]
//! - An authenticated GraphQL client via [`CustomerAccountClient`]
//! - Server-side request authentication and the cookie API via [`server`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_customer_auth::{
//!     ApiVersion, AuthScopes, ClientId, CustomerAuthConfig, Environment, RedirectUri, ShopId,
//! };
//!
//! let config = CustomerAuthConfig::builder()
//!     .client_id(ClientId::new("shp_0d7e4a1c").unwrap())
//!     .shop_id(ShopId::new("68817551676").unwrap())
//!     .redirect_uri(RedirectUri::new("http://localhost:3000/account/callback").unwrap())
//!     .scopes(AuthScopes::default())
//!     .api_version(ApiVersion::latest())
//!     .environment(Environment::Development)
//!     .build()
//!     .unwrap();
//!
//! assert!(!config.use_secure_cookies());
//! ```
//!
//! ## Customer Login
//!
//! ```rust,ignore
//! use shopify_customer_auth::auth::oauth::{AuthCallback, AuthorizeOptions};
//! use shopify_customer_auth::SessionManager;
//!
//! let manager = SessionManager::builder(config).build()?;
//!
//! // Step 1: send the customer to the provider
//! let login = manager.begin_login(&AuthorizeOptions::default()).await?;
//! // redirect to login.url
//!
//! // Step 2: handle the callback
//! let callback = AuthCallback::from_url(&callback_url)?;
//! manager.complete_login(&callback).await?;
//!
//! // Step 3: call the Customer Account API
//! let client = manager.client().await?;
//! let customer = client.customer().await?;
//! ```
//!
//! ## Server-Side Request Authentication
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopify_customer_auth::server::{cookie_proxy, AuthenticatedCustomer, CookieProxy, RequestAuthenticator};
//!
//! async fn me(customer: AuthenticatedCustomer) -> String {
//!     customer.customer.display_name
//! }
//!
//! let app = axum::Router::new()
//!     .route("/api/me", axum::routing::get(me))
//!     .with_state(Arc::new(RequestAuthenticator::new(config.clone())?))
//!     .nest("/api/auth", cookie_proxy::router(Arc::new(CookieProxy::new(config)?)));
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **Whole-object tokens**: A [`TokenSet`] is replaced, never patched

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;

// Re-export public types at crate root for convenience
pub use auth::{
    is_token_expired, now_ms, AuthScopes, CustomerIdentity, SessionManager, SessionState,
    TokenResponse, TokenSet,
};
pub use config::{
    ApiVersion, ClientId, CustomerAuthConfig, CustomerAuthConfigBuilder, Environment, ProviderUrl,
    RedirectUri, ShopId,
};
pub use error::ConfigError;

// Re-export client types
pub use clients::{
    CustomerAccountClient, GraphqlError, HttpClient, HttpError, HttpMethod, HttpRequest,
    HttpRequestBuilder, HttpResponse, HttpResponseError, InvalidHttpRequestError,
};

// Re-export OAuth types for convenience
pub use auth::oauth::{
    begin_auth, build_logout_url, exchange_code_for_tokens, refresh_access_token, AuthCallback,
    AuthorizeOptions, BeginAuthResult, OAuthError, PendingAuthorization,
};
