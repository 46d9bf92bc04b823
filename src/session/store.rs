//! Session Store
//!
//! Owns the authentication flag and the current profile, and is the only
//! component that reads or writes persisted client state:
//! - Two-phase hydrate (local token and cached profile, then remote refresh)
//! - Login, profile edits and logout
//! - Bearer token lookup for protected calls

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use crate::api::UserApi;
use crate::error::{ClientError, Result};
use crate::storage::{KeyValueStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};

use super::token;
use super::types::{ProfileUpdate, RegisterRequest, Session, User};

const PERSISTED_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

// ============================================================================
// Session Store
// ============================================================================

/// Authentication state container
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    storage: Arc<dyn KeyValueStore>,
    api: UserApi,
    state: watch::Sender<Session>,

    /// Bumped whenever the signed-in identity changes; a profile response
    /// started under an older generation is discarded
    generation: AtomicU64,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, api: UserApi) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(SessionStoreInner {
                storage,
                api,
                state,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Current state
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Change notifications for views
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    pub fn api(&self) -> &UserApi {
        &self.inner.api
    }

    // ========================================================================
    // Hydration
    // ========================================================================

    /// Restore the session at startup.
    ///
    /// The optimistic state from [`Self::hydrate_local`] is published before
    /// the profile request is sent. A failed refresh keeps the cached profile
    /// and never signs the user out.
    pub async fn hydrate(&self) -> Result<bool> {
        if !self.hydrate_local()? {
            return Ok(false);
        }

        if let Err(e) = self.refresh_profile().await {
            tracing::warn!(error = %e, "Profile refresh failed, keeping cached profile");
        }
        Ok(true)
    }

    /// Restore the session from storage only. Returns whether a usable token
    /// was found.
    pub fn hydrate_local(&self) -> Result<bool> {
        let storage = &self.inner.storage;

        let token = match storage.get(ACCESS_TOKEN_KEY)? {
            Some(token) if token::is_usable(&token, Utc::now()) => token,
            Some(_) => {
                tracing::debug!("Persisted access token expired, clearing session");
                storage.remove_all(&PERSISTED_KEYS)?;
                self.inner.state.send_replace(Session::default());
                return Ok(false);
            }
            None => {
                self.inner.state.send_replace(Session::default());
                return Ok(false);
            }
        };

        let cached = self.cached_user()?;
        tracing::debug!(
            cached_profile = cached.is_some(),
            expires_at = ?token::expires_at(&token),
            "Hydrated session from storage"
        );

        self.inner.state.send_replace(Session {
            is_authenticated: true,
            user: cached,
        });
        Ok(true)
    }

    /// Fetch the authoritative profile and store it.
    ///
    /// Returns `None` when the session changed while the request was in
    /// flight; the response is then dropped.
    pub async fn refresh_profile(&self) -> Result<Option<User>> {
        let token = self.require_token()?;
        let generation = self.generation();

        let user = self.inner.api.get_profile(&token).await?;
        if generation != self.generation() {
            tracing::debug!(user_id = %user.id, "Discarding profile from a previous session");
            return Ok(None);
        }

        self.update_user_data(user.clone())?;
        Ok(Some(user))
    }

    // ========================================================================
    // State Updates
    // ========================================================================

    /// Mark the session signed in with `user` and persist the profile
    pub fn set_user(&self, user: User) -> Result<()> {
        self.persist_user(&user)?;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_replace(Session {
            is_authenticated: true,
            user: Some(user),
        });
        Ok(())
    }

    /// Replace the profile without touching the auth flag
    pub fn update_user_data(&self, user: User) -> Result<()> {
        self.persist_user(&user)?;
        self.inner.state.send_modify(|session| session.user = Some(user));
        Ok(())
    }

    /// Clear persisted tokens and profile. No network call is made.
    /// On a storage error the session stays signed in.
    pub fn logout(&self) -> Result<()> {
        self.inner.storage.remove_all(&PERSISTED_KEYS)?;
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_replace(Session::default());

        tracing::info!("Signed out");
        Ok(())
    }

    // ========================================================================
    // Account Actions
    // ========================================================================

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let outcome = self.inner.api.login(email, password).await?;

        let storage = &self.inner.storage;
        storage.set(ACCESS_TOKEN_KEY, &outcome.access_token)?;
        match &outcome.refresh_token {
            Some(refresh) => storage.set(REFRESH_TOKEN_KEY, refresh)?,
            None => storage.remove(REFRESH_TOKEN_KEY)?,
        }
        self.set_user(outcome.user.clone())?;

        tracing::info!(user_id = %outcome.user.id, "Signed in");
        Ok(outcome.user)
    }

    /// Create an account. The user still has to verify and sign in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<String> {
        self.inner.api.register(request).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let token = self.require_token()?;
        let generation = self.generation();

        let user = self.inner.api.update_profile(&token, update).await?;
        if generation == self.generation() {
            self.update_user_data(user.clone())?;
        }

        tracing::info!(user_id = %user.id, avatar = update.avatar.is_some(), "Profile updated");
        Ok(user)
    }

    // ========================================================================
    // Tokens
    // ========================================================================

    /// Persisted access token, if still usable
    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self
            .inner
            .storage
            .get(ACCESS_TOKEN_KEY)?
            .filter(|token| token::is_usable(token, Utc::now())))
    }

    /// Access token for a protected call
    pub fn require_token(&self) -> Result<String> {
        self.access_token()?.ok_or(ClientError::AuthRequired)
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.inner.storage.get(REFRESH_TOKEN_KEY)
    }

    fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    fn cached_user(&self) -> Result<Option<User>> {
        let Some(raw) = self.inner.storage.get(USER_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable cached profile");
                Ok(None)
            }
        }
    }

    fn persist_user(&self, user: &User) -> Result<()> {
        let raw = serde_json::to_string(user)?;
        self.inner.storage.set(USER_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::token::make_jwt;
    use crate::storage::MemoryStore;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    fn store_with(mock: &Arc<MockTransport>, storage: &Arc<MemoryStore>) -> SessionStore {
        SessionStore::new(storage.clone(), UserApi::new(mock.clone()))
    }

    fn future_token() -> String {
        make_jwt(Utc::now().timestamp() + 3600)
    }

    fn cached(user_id: &str, name: &str) -> String {
        serde_json::to_string(&User {
            id: user_id.to_string(),
            name: name.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_hydrate_without_token() {
        let mock = Arc::new(MockTransport::new());
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(&mock, &storage);

        assert!(!store.hydrate().await.unwrap());
        assert_eq!(store.snapshot(), Session::default());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_hydrate_refreshes_profile() {
        let mock = Arc::new(MockTransport::new());
        mock.respond("/api/profile", json!({"user": {"id": "u1", "name": "Fresh"}}));
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, &future_token()).unwrap();
        storage.set(USER_KEY, &cached("u1", "Cached")).unwrap();

        let store = store_with(&mock, &storage);
        assert!(store.hydrate().await.unwrap());

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert_eq!(session.user.unwrap().name, "Fresh");

        let persisted: User = serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.name, "Fresh");
    }

    #[tokio::test]
    async fn test_hydrate_is_optimistic_before_refresh() {
        let mock = Arc::new(MockTransport::new());
        mock.respond("/api/profile", json!({"user": {"id": "u1", "name": "Fresh"}}));
        let gate = mock.gate("/api/profile");
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, &future_token()).unwrap();
        storage.set(USER_KEY, &cached("u1", "Cached")).unwrap();

        let store = store_with(&mock, &storage);
        let task = tokio::spawn({
            let store = store.clone();
            async move { store.hydrate().await }
        });
        mock.wait_for_requests(1).await;

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert_eq!(session.user.unwrap().name, "Cached");

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert_eq!(store.snapshot().user.unwrap().name, "Fresh");
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_session() {
        let mock = Arc::new(MockTransport::new());
        mock.fail("/api/profile", 503, "Service unavailable");
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, &future_token()).unwrap();
        storage.set(USER_KEY, &cached("u1", "Cached")).unwrap();

        let store = store_with(&mock, &storage);
        assert!(store.hydrate().await.unwrap());

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert_eq!(session.user.unwrap().name, "Cached");
    }

    #[tokio::test]
    async fn test_token_without_cached_profile() {
        let mock = Arc::new(MockTransport::new());
        mock.fail("/api/profile", 500, "boom");
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, "opaque-token").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();

        let store = store_with(&mock, &storage);
        assert!(store.hydrate().await.unwrap());

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert!(session.user.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_cleared() {
        let mock = Arc::new(MockTransport::new());
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, &make_jwt(Utc::now().timestamp() - 60)).unwrap();
        storage.set(USER_KEY, &cached("u1", "Cached")).unwrap();

        let store = store_with(&mock, &storage);
        assert!(!store.hydrate().await.unwrap());
        assert_eq!(store.snapshot(), Session::default());
        assert!(storage.is_empty());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_logout_then_hydrate() {
        let mock = Arc::new(MockTransport::new());
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, &future_token()).unwrap();
        storage.set(REFRESH_TOKEN_KEY, "refresh").unwrap();
        storage.set(USER_KEY, &cached("u1", "Cached")).unwrap();

        let store = store_with(&mock, &storage);
        assert!(store.hydrate_local().unwrap());

        store.logout().unwrap();
        assert!(storage.is_empty());

        assert!(!store.hydrate().await.unwrap());
        assert_eq!(store.snapshot(), Session::default());
    }

    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(ClientError::Storage("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_logout_storage_failure_keeps_session() {
        let mock = Arc::new(MockTransport::new());
        let storage = Arc::new(ReadOnlyStore(MemoryStore::new()));
        storage.set(ACCESS_TOKEN_KEY, &future_token()).unwrap();
        storage.set(USER_KEY, &cached("u1", "Cached")).unwrap();

        let store = SessionStore::new(storage.clone(), UserApi::new(mock.clone()));
        assert!(store.hydrate_local().unwrap());

        assert!(matches!(store.logout(), Err(ClientError::Storage(_))));
        assert!(store.is_authenticated());
        assert_eq!(store.snapshot().user.map(|u| u.id), Some("u1".to_string()));
        assert!(storage.get(ACCESS_TOKEN_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_refresh_after_logout_is_discarded() {
        let mock = Arc::new(MockTransport::new());
        mock.respond("/api/profile", json!({"user": {"id": "u1", "name": "Fresh"}}));
        let gate = mock.gate("/api/profile");
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, &future_token()).unwrap();

        let store = store_with(&mock, &storage);
        let task = tokio::spawn({
            let store = store.clone();
            async move { store.hydrate().await }
        });
        mock.wait_for_requests(1).await;

        store.logout().unwrap();
        gate.notify_one();
        task.await.unwrap().unwrap();

        assert_eq!(store.snapshot(), Session::default());
        assert!(storage.get(USER_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_persists_tokens() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            "/api/login",
            json!({
                "access_token": "acc",
                "refresh_token": "ref",
                "user": {"id": "u1", "email": "lan@example.com", "name": "Lan"}
            }),
        );
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(&mock, &storage);
        let mut changes = store.subscribe();

        let user = store.login("lan@example.com", "secret").await.unwrap();
        assert_eq!(user.id, "u1");
        assert!(changes.has_changed().unwrap());
        assert!(changes.borrow_and_update().is_authenticated);

        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("acc"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("ref"));
        assert_eq!(store.require_token().unwrap(), "acc");
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session() {
        let mock = Arc::new(MockTransport::new());
        mock.fail("/api/login", 401, "Invalid credentials");
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(&mock, &storage);

        let err = store.login("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_update_user_data_keeps_flag() {
        let mock = Arc::new(MockTransport::new());
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(&mock, &storage);

        store
            .update_user_data(User {
                id: "u1".to_string(),
                ..Default::default()
            })
            .unwrap();

        let session = store.snapshot();
        assert!(!session.is_authenticated);
        assert_eq!(session.user.unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_update_profile_requires_token() {
        let mock = Arc::new(MockTransport::new());
        let storage = Arc::new(MemoryStore::new());
        let store = store_with(&mock, &storage);

        let result = store.update_profile(&ProfileUpdate::default()).await;
        assert!(matches!(result, Err(ClientError::AuthRequired)));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_update_profile_replaces_user() {
        let mock = Arc::new(MockTransport::new());
        mock.respond("/api/profile", json!({"user": {"id": "u1", "name": "Renamed"}}));
        let storage = Arc::new(MemoryStore::new());
        storage.set(ACCESS_TOKEN_KEY, &future_token()).unwrap();

        let store = store_with(&mock, &storage);
        store.set_user(User { id: "u1".to_string(), ..Default::default() }).unwrap();

        let update = ProfileUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        store.update_profile(&update).await.unwrap();

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert_eq!(session.user.unwrap().name, "Renamed");
    }
}
