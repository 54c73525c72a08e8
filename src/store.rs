use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    models::User,
    storage::{PersistedSession, StorageState},
};

#[derive(Debug, Default)]
struct AuthState {
    user: Option<User>,
    token: Option<String>,
    refresh_token: Option<String>,
    initialized: bool,
}

/// AuthSnapshot
///
/// A copy of the store's observable state at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub initialized: bool,
}

/// AuthStore
///
/// The client's authentication state: current user, access token, and whether
/// the load-time restore has finished. Constructed explicitly and shared by
/// `Arc`, so each test (or each window) gets its own instance.
///
/// Every mutation that changes credentials is mirrored to the backing
/// [`TokenStorage`](crate::storage::TokenStorage).
pub struct AuthStore {
    state: RwLock<AuthState>,
    storage: StorageState,
}

impl AuthStore {
    pub fn new(storage: StorageState) -> Self {
        Self {
            state: RwLock::new(AuthState::default()),
            storage,
        }
    }

    // Lock poisoning only means another thread panicked mid-update; the state
    // itself is always a valid combination of options, so keep going.
    fn read(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Loads token, refresh token and cached user from storage into memory.
    pub fn hydrate(&self) {
        let persisted = self.storage.load();
        let mut state = self.write();
        state.token = persisted.access_token;
        state.refresh_token = persisted.refresh_token;
        state.user = persisted.user;
    }

    /// Adopts a user and access token and persists them. The refresh token, which
    /// the backend manages, is left as it is.
    pub fn login(&self, user: User, token: String) {
        let persisted = {
            let mut state = self.write();
            state.user = Some(user);
            state.token = Some(token);
            PersistedSession {
                access_token: state.token.clone(),
                refresh_token: state.refresh_token.clone(),
                user: state.user.clone(),
            }
        };
        self.storage.save(&persisted);
    }

    /// Adopts a user without touching the access token. Used when the backend
    /// vouches for the user from the refresh cookie alone; `is_authenticated`
    /// stays false until a token arrives.
    pub fn set_user(&self, user: User) {
        let persisted = {
            let mut state = self.write();
            state.user = Some(user);
            PersistedSession {
                access_token: state.token.clone(),
                refresh_token: state.refresh_token.clone(),
                user: state.user.clone(),
            }
        };
        self.storage.save(&persisted);
    }

    /// Clears every credential, in memory and in storage. Leaves `initialized`
    /// alone.
    pub fn logout(&self) {
        {
            let mut state = self.write();
            state.user = None;
            state.token = None;
            state.refresh_token = None;
        }
        self.storage.clear();
    }

    pub fn mark_initialized(&self) {
        self.write().initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        let state = self.read();
        AuthSnapshot {
            user: state.user.clone(),
            token: state.token.clone(),
            is_authenticated: state.token.is_some(),
            initialized: state.initialized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryTokenStorage, TokenStorage};
    use std::sync::Arc;

    fn user() -> User {
        User {
            id: "u-7".to_string(),
            email: "seven@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn set_user_keeps_token_state() {
        let storage = MemoryTokenStorage::with_session(PersistedSession {
            refresh_token: Some("ref".to_string()),
            ..Default::default()
        });
        let store = AuthStore::new(Arc::new(storage.clone()));
        store.hydrate();
        store.set_user(user());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.user, Some(user()));
        assert_eq!(snapshot.token, None);
        assert!(!snapshot.is_authenticated);

        let persisted = storage.load();
        assert_eq!(persisted.user, Some(user()));
        assert_eq!(persisted.refresh_token.as_deref(), Some("ref"));
    }

    #[test]
    fn hydrate_reads_persisted_state() {
        let storage = MemoryTokenStorage::with_session(PersistedSession {
            access_token: Some("tok".to_string()),
            refresh_token: Some("ref".to_string()),
            user: Some(user()),
        });
        let store = AuthStore::new(Arc::new(storage));
        assert!(!store.snapshot().is_authenticated);

        store.hydrate();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.token.as_deref(), Some("tok"));
        assert_eq!(snapshot.user, Some(user()));
        assert!(snapshot.is_authenticated);
        assert_eq!(store.refresh_token().as_deref(), Some("ref"));
    }

    #[test]
    fn login_persists_and_keeps_refresh_token() {
        let storage = MemoryTokenStorage::with_session(PersistedSession {
            refresh_token: Some("ref".to_string()),
            ..Default::default()
        });
        let store = AuthStore::new(Arc::new(storage.clone()));
        store.hydrate();
        store.login(user(), "fresh".to_string());

        let persisted = storage.load();
        assert_eq!(persisted.access_token.as_deref(), Some("fresh"));
        assert_eq!(persisted.refresh_token.as_deref(), Some("ref"));
        assert_eq!(persisted.user, Some(user()));
    }

    #[test]
    fn logout_clears_memory_and_storage_but_not_initialized() {
        let storage = MemoryTokenStorage::new();
        let store = AuthStore::new(Arc::new(storage.clone()));
        store.login(user(), "tok".to_string());
        store.mark_initialized();

        store.logout();

        assert_eq!(
            store.snapshot(),
            AuthSnapshot {
                user: None,
                token: None,
                is_authenticated: false,
                initialized: true,
            }
        );
        assert_eq!(storage.load(), PersistedSession::default());
    }
}
