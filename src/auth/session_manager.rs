//! Session orchestration: login, lazy refresh and logout against storage.
//!
//! [`SessionManager`] is the one object a storefront holds per customer
//! context. It owns no tokens itself; the current [`TokenSet`] always lives
//! in the storage backend selected by
//! [`CustomerAuthConfig::use_secure_cookies`], which is consulted on every
//! call.
//!
//! # State machine
//!
//! ```text
//! Anonymous --begin_login--> Authorizing --callback ok--> Exchanging --tokens stored--> Authenticated
//!     ^                          |                            |                             |
//!     +------ callback error ----+------- exchange error -----+      token near expiry      v
//!     ^                                                                                 Refreshing
//!     +------------------------------ refresh failure / logout -----------------------------+
//! ```
//!
//! # Refresh
//!
//! Any call that needs a token checks `now + refresh_buffer >= expires_at`
//! and refreshes first. Refreshes are single-flight: callers queue on one
//! guard and re-read storage once they hold it, so a token refreshed by the
//! caller ahead of them is reused instead of being refreshed again.

use std::sync::{Arc, PoisonError, RwLock};

use subtle::ConstantTimeEq;

use crate::auth::oauth::{
    begin_auth, build_logout_url, exchange_code_for_tokens, refresh_access_token, AuthCallback,
    AuthorizeOptions, BeginAuthResult, IdTokenClaims, OAuthError, PendingAuthorization,
};
use crate::auth::{now_ms, CustomerIdentity, TokenSet};
use crate::clients::{CustomerAccountClient, HttpClient};
use crate::config::CustomerAuthConfig;
use crate::storage::{
    CookieTokenStorage, KeyValueStore, LocalTokenStorage, MemoryStore, StorageAccess,
    StorageError, TokenStorage, UnpartitionedStorage,
};

/// Where a [`SessionManager`] is in the login lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No session.
    #[default]
    Anonymous,
    /// Sent to the provider; waiting for the callback.
    Authorizing,
    /// Exchanging the authorization code.
    Exchanging,
    /// A token set is stored.
    Authenticated,
    /// Trading the refresh token for a new access token.
    Refreshing,
}

/// Runs the customer login flow and keeps the stored token set fresh.
///
/// # Thread Safety
///
/// `SessionManager` is `Send + Sync`; share it behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use shopify_customer_auth::auth::oauth::{AuthCallback, AuthorizeOptions};
/// use shopify_customer_auth::auth::SessionManager;
///
/// let manager = SessionManager::builder(config).build()?;
///
/// // Login button
/// let login = manager.begin_login(&AuthorizeOptions::default()).await?;
/// // redirect to login.url
///
/// // Callback route
/// manager.complete_login(&AuthCallback::from_url(&url)?).await?;
///
/// // Anywhere
/// if let Some(customer) = manager.customer().await {
///     println!("Hello {}", customer.display_name);
/// }
///
/// // Logout button
/// let logout_url = manager.logout().await?;
/// ```
#[derive(Debug)]
pub struct SessionManager {
    config: CustomerAuthConfig,
    http: HttpClient,
    cookie_storage: Option<Arc<dyn TokenStorage>>,
    local_storage: Arc<dyn TokenStorage>,
    ephemeral: Arc<dyn KeyValueStore>,
    storage_access: Arc<dyn StorageAccess>,
    state: RwLock<SessionState>,
    refresh_guard: tokio::sync::Mutex<()>,
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionManager>();
};

impl SessionManager {
    /// Creates a builder for `config`.
    #[must_use]
    pub fn builder(config: CustomerAuthConfig) -> SessionManagerBuilder {
        SessionManagerBuilder::new(config)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CustomerAuthConfig {
        &self.config
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            tracing::debug!(from = ?*state, to = ?next, "Session state changed");
            *state = next;
        }
    }

    fn storage(&self) -> Result<&dyn TokenStorage, OAuthError> {
        if self.config.use_secure_cookies() {
            self.cookie_storage
                .as_deref()
                .ok_or(OAuthError::Storage(StorageError::NotConfigured))
        } else {
            Ok(self.local_storage.as_ref())
        }
    }

    /// Starts a login.
    ///
    /// Persists a fresh [`PendingAuthorization`], replacing any abandoned
    /// one, and returns the URL to send the customer to.
    ///
    /// In secure cookie mode, storage access is requested here. Call this
    /// from the login click handler so the request runs inside a user
    /// gesture; the callback redirect that reaches
    /// [`complete_login`](Self::complete_login) is not one.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::StorageAccessDenied`] when cookies are blocked
    /// - [`OAuthError::Storage`] if the pending values cannot be saved
    pub async fn begin_login(
        &self,
        options: &AuthorizeOptions,
    ) -> Result<BeginAuthResult, OAuthError> {
        self.ensure_storage_access().await?;
        let result = begin_auth(&self.config, options);
        result.pending.save(self.ephemeral.as_ref())?;
        self.set_state(SessionState::Authorizing);
        tracing::info!(shop_id = %self.config.shop_id(), "Customer login started");
        Ok(result)
    }

    /// Completes a login from the provider's callback.
    ///
    /// The pending authorization is consumed before anything else, so the
    /// verifier is gone whatever the outcome. Provider errors, a missing or
    /// mismatched `state` and a missing `code` fail without contacting the
    /// token endpoint.
    ///
    /// In secure cookie mode, storage access is checked again here. It is
    /// normally already granted by [`begin_login`](Self::begin_login).
    ///
    /// # Errors
    ///
    /// - [`OAuthError::ProviderDenied`] when the callback carries `error`
    /// - [`OAuthError::InvalidState`] when no login is pending or `state` differs
    /// - [`OAuthError::MissingCode`] when `code` is absent
    /// - [`OAuthError::StorageAccessDenied`] when cookies are blocked
    /// - [`OAuthError::NonceMismatch`] when the ID token belongs to another login
    /// - any token endpoint error from [`exchange_code_for_tokens`]
    pub async fn complete_login(&self, callback: &AuthCallback) -> Result<TokenSet, OAuthError> {
        let pending = PendingAuthorization::take(self.ephemeral.as_ref());
        let outcome = match pending {
            Ok(pending) => self.finish_login(callback, pending).await,
            Err(e) => Err(e.into()),
        };

        match &outcome {
            Ok(_) => {
                self.set_state(SessionState::Authenticated);
                tracing::info!(shop_id = %self.config.shop_id(), "Customer login completed");
            }
            Err(e) => {
                self.set_state(SessionState::Anonymous);
                tracing::warn!("Customer login failed: {e}");
            }
        }
        outcome
    }

    async fn finish_login(
        &self,
        callback: &AuthCallback,
        pending: Option<PendingAuthorization>,
    ) -> Result<TokenSet, OAuthError> {
        if let Some(error) = &callback.error {
            return Err(OAuthError::ProviderDenied {
                error: error.clone(),
                description: callback.error_description.clone(),
            });
        }

        let Some(pending) = pending else {
            return Err(OAuthError::InvalidState {
                received: callback.state.clone(),
            });
        };
        let state_matches = callback
            .state
            .as_deref()
            .is_some_and(|received| bool::from(received.as_bytes().ct_eq(pending.state.as_bytes())));
        if !state_matches {
            return Err(OAuthError::InvalidState {
                received: callback.state.clone(),
            });
        }

        let code = callback.code.as_deref().ok_or(OAuthError::MissingCode)?;

        self.ensure_storage_access().await?;
        let storage = self.storage()?;

        self.set_state(SessionState::Exchanging);
        let response =
            exchange_code_for_tokens(&self.http, &self.config, code, &pending.code_verifier).await?;
        let tokens = TokenSet::from_response(response, now_ms());

        if let Some(id_token) = &tokens.id_token {
            let claims = IdTokenClaims::decode_unverified(id_token)?;
            if !claims.nonce_matches(&pending.nonce) {
                return Err(OAuthError::NonceMismatch);
            }
        }

        storage.write(&tokens).await?;
        Ok(tokens)
    }

    async fn ensure_storage_access(&self) -> Result<(), OAuthError> {
        if self.config.use_secure_cookies()
            && !self.storage_access.has_storage_access().await
            && !self.storage_access.request_storage_access().await
        {
            tracing::warn!("Storage access denied");
            return Err(OAuthError::StorageAccessDenied);
        }
        Ok(())
    }

    /// Returns the current token set, refreshing it first when it is inside
    /// the refresh buffer.
    ///
    /// Returns `Ok(None)` when there is no session.
    ///
    /// # Errors
    ///
    /// Returns the refresh error after clearing the session, or
    /// [`OAuthError::Storage`] if storage cannot be read.
    pub async fn tokens(&self) -> Result<Option<TokenSet>, OAuthError> {
        let storage = self.storage()?;
        let Some(tokens) = storage.read().await? else {
            self.set_state(SessionState::Anonymous);
            return Ok(None);
        };

        if !tokens.is_expired(self.config.refresh_buffer()) {
            self.set_state(SessionState::Authenticated);
            return Ok(Some(tokens));
        }

        tracing::debug!("Access token is inside the refresh buffer");
        self.refresh_from(&tokens.access_token).await.map(Some)
    }

    /// Returns a fresh access token, or `None` when there is no session.
    ///
    /// # Errors
    ///
    /// Same as [`tokens`](Self::tokens).
    pub async fn access_token(&self) -> Result<Option<String>, OAuthError> {
        Ok(self.tokens().await?.map(|tokens| tokens.access_token))
    }

    /// Refreshes the access token now, whatever its expiry.
    ///
    /// Shares the single-flight path with [`tokens`](Self::tokens): if another
    /// caller refreshed while this one waited, that result is returned.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::NoSession`] when nothing is stored
    /// - [`OAuthError::NoRefreshToken`] when the session cannot be refreshed
    /// - any token endpoint error from [`refresh_access_token`]
    ///
    /// The session is cleared on every refresh failure.
    pub async fn refresh(&self) -> Result<TokenSet, OAuthError> {
        let current = self
            .storage()?
            .read()
            .await?
            .ok_or(OAuthError::NoSession)?;
        self.refresh_from(&current.access_token).await
    }

    async fn refresh_from(&self, stale_access_token: &str) -> Result<TokenSet, OAuthError> {
        let _singleflight = self.refresh_guard.lock().await;
        let storage = self.storage()?;

        let Some(current) = storage.read().await? else {
            self.set_state(SessionState::Anonymous);
            return Err(OAuthError::NoSession);
        };
        if current.access_token != stale_access_token {
            tracing::debug!("Token already refreshed by a concurrent caller");
            self.set_state(SessionState::Authenticated);
            return Ok(current);
        }

        self.set_state(SessionState::Refreshing);
        let outcome = match current.refresh_token.as_deref() {
            Some(refresh_token) => {
                tracing::debug!("Refreshing access token");
                match refresh_access_token(&self.http, &self.config, refresh_token).await {
                    Ok(response) => {
                        let next = TokenSet::from_refresh(response, &current, now_ms());
                        // An unsaved refresh result ends the session.
                        storage.write(&next).await.map(|()| next).map_err(OAuthError::from)
                    }
                    Err(e) => Err(e),
                }
            }
            None => Err(OAuthError::NoRefreshToken),
        };

        match outcome {
            Ok(next) => {
                self.set_state(SessionState::Authenticated);
                tracing::info!(expires_in = next.expires_in, "Access token refreshed");
                Ok(next)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed, clearing session: {e}");
                if let Err(clear_error) = storage.clear().await {
                    tracing::warn!("Failed to clear session after refresh failure: {clear_error}");
                }
                self.set_state(SessionState::Anonymous);
                Err(e)
            }
        }
    }

    /// Returns `true` if a usable (possibly just refreshed) token set is stored.
    pub async fn is_authenticated(&self) -> bool {
        matches!(self.tokens().await, Ok(Some(_)))
    }

    /// Returns a Customer Account API client for the current access token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::NoSession`] when there is no session, or any
    /// error from [`tokens`](Self::tokens).
    pub async fn client(&self) -> Result<CustomerAccountClient, OAuthError> {
        let tokens = self.tokens().await?.ok_or(OAuthError::NoSession)?;
        Ok(CustomerAccountClient::with_http_client(
            &self.config,
            self.http.clone(),
            tokens.access_token,
        ))
    }

    /// Fetches the signed-in customer.
    ///
    /// Returns `None` when there is no session or the API does not accept the
    /// token; callers treat that as signed out.
    pub async fn customer(&self) -> Option<CustomerIdentity> {
        let client = match self.client().await {
            Ok(client) => client,
            Err(OAuthError::NoSession) => return None,
            Err(e) => {
                tracing::warn!("Cannot load customer: {e}");
                return None;
            }
        };

        match client.customer().await {
            Ok(customer) => customer,
            Err(e) => {
                tracing::warn!(unauthorized = e.is_unauthorized(), "Customer query failed: {e}");
                None
            }
        }
    }

    /// Signs the customer out.
    ///
    /// Clears both storage backends and any pending login, and returns the
    /// provider logout URL, with `id_token_hint` when an ID token was stored.
    /// Backend failures are logged; the returned URL is still valid and the
    /// manager is anonymous afterwards.
    ///
    /// A refresh already in flight finishes first and its result is cleared
    /// with the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Storage`] only when the secure cookie backend is
    /// selected but not configured.
    pub async fn logout(&self) -> Result<String, OAuthError> {
        let storage = self.storage()?;
        // Waits out an in-flight refresh; queued refreshes then find no session.
        let _singleflight = self.refresh_guard.lock().await;
        let id_token = match storage.read().await {
            Ok(tokens) => tokens.and_then(|tokens| tokens.id_token),
            Err(e) => {
                tracing::warn!("Could not read tokens before logout: {e}");
                None
            }
        };

        let backends = self
            .cookie_storage
            .iter()
            .chain(std::iter::once(&self.local_storage));
        for backend in backends {
            if let Err(e) = backend.clear().await {
                tracing::warn!(storage = %backend.kind(), "Failed to clear tokens: {e}");
            }
        }
        if let Err(e) = PendingAuthorization::discard(self.ephemeral.as_ref()) {
            tracing::warn!("Failed to clear pending login: {e}");
        }

        self.set_state(SessionState::Anonymous);
        tracing::info!(shop_id = %self.config.shop_id(), "Customer logged out");
        Ok(build_logout_url(&self.config, id_token.as_deref()))
    }
}

/// Builder for [`SessionManager`].
///
/// Every collaborator is optional:
///
/// | Collaborator | Default |
/// |---|---|
/// | HTTP client | [`HttpClient::new`] |
/// | Cookie storage | [`CookieTokenStorage::from_config`] when a cookie API URL is configured |
/// | Ephemeral store | a new [`MemoryStore`] |
/// | Local storage | [`LocalTokenStorage`] over the ephemeral store |
/// | Storage access | [`UnpartitionedStorage`] |
#[derive(Debug)]
pub struct SessionManagerBuilder {
    config: CustomerAuthConfig,
    http: Option<HttpClient>,
    cookie_storage: Option<Arc<dyn TokenStorage>>,
    local_storage: Option<Arc<dyn TokenStorage>>,
    ephemeral: Option<Arc<dyn KeyValueStore>>,
    storage_access: Option<Arc<dyn StorageAccess>>,
}

impl SessionManagerBuilder {
    fn new(config: CustomerAuthConfig) -> Self {
        Self {
            config,
            http: None,
            cookie_storage: None,
            local_storage: None,
            ephemeral: None,
            storage_access: None,
        }
    }

    /// Sets the HTTP client used for token requests and GraphQL calls.
    #[must_use]
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the secure cookie backend.
    #[must_use]
    pub fn cookie_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.cookie_storage = Some(storage);
        self
    }

    /// Sets the development backend.
    #[must_use]
    pub fn local_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.local_storage = Some(storage);
        self
    }

    /// Sets the store holding the pending login values.
    #[must_use]
    pub fn ephemeral_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.ephemeral = Some(store);
        self
    }

    /// Sets the storage access hook.
    #[must_use]
    pub fn storage_access(mut self, access: Arc<dyn StorageAccess>) -> Self {
        self.storage_access = Some(access);
        self
    }

    /// Builds the manager.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::HttpError`] or [`OAuthError::Storage`] if a
    /// default collaborator cannot be created.
    pub fn build(self) -> Result<SessionManager, OAuthError> {
        let http = match self.http {
            Some(http) => http,
            None => HttpClient::new(&self.config)?,
        };
        let cookie_storage = match self.cookie_storage {
            Some(storage) => Some(storage),
            None if self.config.cookie_api_url().is_some() => {
                let storage: Arc<dyn TokenStorage> =
                    Arc::new(CookieTokenStorage::from_config(&self.config)?);
                Some(storage)
            }
            None => None,
        };
        let ephemeral = self
            .ephemeral
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let local_storage = self
            .local_storage
            .unwrap_or_else(|| Arc::new(LocalTokenStorage::new(ephemeral.clone())));
        let storage_access = self
            .storage_access
            .unwrap_or_else(|| Arc::new(UnpartitionedStorage));

        if self.config.use_secure_cookies() && cookie_storage.is_none() {
            return Err(StorageError::NotConfigured.into());
        }

        Ok(SessionManager {
            config: self.config,
            http,
            cookie_storage,
            local_storage,
            ephemeral,
            storage_access,
            state: RwLock::new(SessionState::Anonymous),
            refresh_guard: tokio::sync::Mutex::new(()),
        })
    }
}
