//! Storage access negotiation for embedded contexts.

use async_trait::async_trait;

/// Grants or denies access to first-party storage.
///
/// Inside a third-party iframe a browser may partition cookies and storage
/// until the user grants access. Login checks this before starting and fails
/// with [`OAuthError::StorageAccessDenied`](crate::auth::oauth::OAuthError::StorageAccessDenied)
/// when access cannot be obtained.
#[async_trait]
pub trait StorageAccess: Send + Sync + std::fmt::Debug {
    /// Returns `true` if storage is already usable.
    async fn has_storage_access(&self) -> bool;

    /// Asks for access. Returns `true` if it was granted.
    async fn request_storage_access(&self) -> bool;
}

/// A context where storage is never partitioned. Always grants access.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnpartitionedStorage;

#[async_trait]
impl StorageAccess for UnpartitionedStorage {
    async fn has_storage_access(&self) -> bool {
        true
    }

    async fn request_storage_access(&self) -> bool {
        true
    }
}
