//! Token storage backends.
//!
//! A customer session lives in exactly one [`TokenStorage`] backend, chosen by
//! [`CustomerAuthConfig::use_secure_cookies`](crate::CustomerAuthConfig::use_secure_cookies):
//!
//! - [`CookieTokenStorage`]: httpOnly cookies managed by a server-side cookie
//!   API (see [`server::cookie_proxy`](crate::server::cookie_proxy)). For production.
//! - [`LocalTokenStorage`]: an unencrypted JSON entry in a [`KeyValueStore`].
//!   For local development only.
//!
//! The short-lived login values (state, nonce, PKCE verifier) always go to a
//! [`KeyValueStore`] through
//! [`PendingAuthorization`](crate::auth::oauth::PendingAuthorization).
//!
//! # Example
//!
//! ```rust
//! use shopify_customer_auth::storage::{KeyValueStore, LocalTokenStorage, MemoryStore, TokenStorage};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let storage = LocalTokenStorage::new(store.clone());
//! assert_eq!(storage.kind().as_str(), "local");
//! assert!(store.get("shopify-tokens").unwrap().is_none());
//! ```

mod access;
mod cookie;
mod local;

pub use access::{StorageAccess, UnpartitionedStorage};
pub use cookie::CookieTokenStorage;
pub use local::{JsonFileStore, LocalTokenStorage, MemoryStore};

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::TokenSet;
use crate::clients::{HttpError, HttpResponseError};

/// Key of the persisted token set in a [`KeyValueStore`].
pub const TOKENS_KEY: &str = "shopify-tokens";
/// Key of the pending `state`.
pub const STATE_KEY: &str = "shopify-auth-state";
/// Key of the pending `nonce`.
pub const NONCE_KEY: &str = "shopify-auth-nonce";
/// Key of the pending PKCE code verifier.
pub const CODE_VERIFIER_KEY: &str = "shopify-auth-code-verifier";

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Stored data could not be (de)serialized.
    #[error("Failed to (de)serialize stored data: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A file-backed store failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cookie API could not be reached.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The cookie API answered with an unexpected status.
    #[error("Cookie API call '{endpoint}' failed: {source}")]
    CookieApi {
        /// The endpoint that failed (e.g. `set-tokens`).
        endpoint: &'static str,
        /// The status and body returned.
        #[source]
        source: HttpResponseError,
    },

    /// Secure cookie storage was requested without a cookie API URL.
    #[error("Cookie API URL is not configured")]
    NotConfigured,

    /// A lock guarding an in-process store was poisoned by a panic.
    #[error("Storage lock poisoned")]
    Poisoned,
}

impl StorageError {
    /// Returns `true` for failures that may succeed if retried later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_transient(),
            Self::CookieApi { source, .. } => source.code >= 500,
            Self::Serialization(_) | Self::Io(_) | Self::NotConfigured | Self::Poisoned => false,
        }
    }
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StorageError>();
};

/// Which backend a [`TokenStorage`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    /// httpOnly cookies behind the cookie API.
    SecureCookies,
    /// A client-side key/value store.
    Local,
}

impl StorageKind {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SecureCookies => "secure-cookies",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A synchronous string key/value store, shaped like browser `localStorage`.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Removes `key` and returns its previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read or written.
    fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self.get(key)?;
        self.remove(key)?;
        Ok(value)
    }
}

/// Where the current [`TokenSet`] lives.
///
/// Writes replace the whole token set in one call; there is no field-level
/// update.
#[async_trait]
pub trait TokenStorage: Send + Sync + fmt::Debug {
    /// Returns the stored token set, or `None` when there is no session.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails in a way that is not
    /// simply "no session".
    async fn read(&self) -> Result<Option<TokenSet>, StorageError>;

    /// Replaces the stored token set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    async fn write(&self, tokens: &TokenSet) -> Result<(), StorageError>;

    /// Removes the stored token set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    async fn clear(&self) -> Result<(), StorageError>;

    /// Returns which backend this is.
    fn kind(&self) -> StorageKind;
}
