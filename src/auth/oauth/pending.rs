//! Login values kept across the provider redirect.

use std::fmt;

use crate::auth::oauth::pkce::PkceParams;
use crate::storage::{KeyValueStore, StorageError, CODE_VERIFIER_KEY, NONCE_KEY, STATE_KEY};

/// The `state`, `nonce` and PKCE verifier of an in-flight login.
///
/// Single use: [`take`](Self::take) removes all three keys whether or not the
/// callback turns out to be valid, so a verifier is never presented twice.
/// Saving a new one overwrites any abandoned attempt.
///
/// # Example
///
/// ```rust
/// use shopify_customer_auth::auth::oauth::PendingAuthorization;
/// use shopify_customer_auth::storage::MemoryStore;
///
/// let store = MemoryStore::new();
/// let pending = PendingAuthorization::new("state-1", "nonce-1", "verifier-1");
/// pending.save(&store).unwrap();
///
/// assert_eq!(PendingAuthorization::take(&store).unwrap(), Some(pending));
/// assert_eq!(PendingAuthorization::take(&store).unwrap(), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PendingAuthorization {
    /// The `state` sent on the authorize request.
    pub state: String,
    /// The `nonce` sent on the authorize request.
    pub nonce: String,
    /// The PKCE code verifier.
    pub code_verifier: String,
}

impl PendingAuthorization {
    /// Creates a pending authorization from its parts.
    #[must_use]
    pub fn new(
        state: impl Into<String>,
        nonce: impl Into<String>,
        code_verifier: impl Into<String>,
    ) -> Self {
        Self {
            state: state.into(),
            nonce: nonce.into(),
            code_verifier: code_verifier.into(),
        }
    }

    /// Writes the three values to `store`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be written.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.set(STATE_KEY, &self.state)?;
        store.set(NONCE_KEY, &self.nonce)?;
        store.set(CODE_VERIFIER_KEY, &self.code_verifier)
    }

    /// Removes the three values from `store` and returns them.
    ///
    /// Returns `None` if any of them was missing; the others are still
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read or written.
    pub fn take(store: &dyn KeyValueStore) -> Result<Option<Self>, StorageError> {
        let state = store.take(STATE_KEY)?;
        let nonce = store.take(NONCE_KEY)?;
        let code_verifier = store.take(CODE_VERIFIER_KEY)?;

        Ok(match (state, nonce, code_verifier) {
            (Some(state), Some(nonce), Some(code_verifier)) => Some(Self {
                state,
                nonce,
                code_verifier,
            }),
            _ => None,
        })
    }

    /// Removes any pending values from `store` without reading them.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be written.
    pub fn discard(store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.remove(STATE_KEY)?;
        store.remove(NONCE_KEY)?;
        store.remove(CODE_VERIFIER_KEY)
    }
}

impl From<PkceParams> for PendingAuthorization {
    fn from(params: PkceParams) -> Self {
        Self {
            state: params.state,
            nonce: params.nonce,
            code_verifier: params.code_verifier,
        }
    }
}

impl fmt::Debug for PendingAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAuthorization")
            .field("state", &self.state)
            .field("nonce", &self.nonce)
            .field("code_verifier", &"*****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_save_uses_documented_keys() {
        let store = MemoryStore::new();
        PendingAuthorization::new("s", "n", "v").save(&store).unwrap();

        assert_eq!(store.get("shopify-auth-state").unwrap().as_deref(), Some("s"));
        assert_eq!(store.get("shopify-auth-nonce").unwrap().as_deref(), Some("n"));
        assert_eq!(
            store.get("shopify-auth-code-verifier").unwrap().as_deref(),
            Some("v")
        );
    }

    #[test]
    fn test_take_with_partial_values_clears_everything() {
        let store = MemoryStore::new();
        store.set(STATE_KEY, "s").unwrap();
        store.set(CODE_VERIFIER_KEY, "v").unwrap();

        assert!(PendingAuthorization::take(&store).unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_save_overwrites_previous_attempt() {
        let store = MemoryStore::new();
        PendingAuthorization::new("old", "old", "old").save(&store).unwrap();
        PendingAuthorization::new("new", "n2", "v2").save(&store).unwrap();

        let pending = PendingAuthorization::take(&store).unwrap().unwrap();
        assert_eq!(pending.state, "new");
        assert_eq!(pending.code_verifier, "v2");
    }

    #[test]
    fn test_discard() {
        let store = MemoryStore::new();
        PendingAuthorization::new("s", "n", "v").save(&store).unwrap();
        store.set("unrelated", "x").unwrap();

        PendingAuthorization::discard(&store).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_debug_masks_verifier() {
        let debug = format!("{:?}", PendingAuthorization::new("s", "n", "secret-verifier"));
        assert!(!debug.contains("secret-verifier"));
    }
}
