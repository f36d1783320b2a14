//! Customer authentication types.
//!
//! This module provides the token model, scopes, customer identity and the
//! session orchestrator used for Shopify customer accounts.
//!
//! # Overview
//!
//! - [`AuthScopes`]: The scopes requested on the authorize request
//! - [`TokenSet`]: The tokens that make up a session, with expiry arithmetic
//! - [`CustomerIdentity`]: The signed-in customer, as reported by the API
//! - [`SessionManager`]: Login, lazy refresh and logout against storage
//! - [`oauth`]: The Authorization Code flow with PKCE, step by step
//!
//! # Example
//!
//! ```rust
//! use shopify_customer_auth::{is_token_expired, AuthScopes};
//! use std::time::Duration;
//!
//! let scopes = AuthScopes::default();
//! assert!(scopes.contains("openid"));
//!
//! let issued_at = 1_700_000_000_000;
//! assert!(is_token_expired(3600, issued_at, Duration::from_secs(300), issued_at + 3_301_000));
//! ```

pub(crate) mod customer;
pub mod oauth;
mod scopes;
mod session_manager;
mod token_set;

pub use customer::CustomerIdentity;
pub use scopes::AuthScopes;
pub use session_manager::{SessionManager, SessionManagerBuilder, SessionState};
pub use token_set::{is_token_expired, now_ms, TokenResponse, TokenSet};
