use std::{
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};

use crate::models::User;

/// PersistedSession
///
/// What survives between application loads: the last access token, the refresh
/// token (if the client can see it), and the cached user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

// 1. TokenStorage Contract
/// TokenStorage
///
/// Local, synchronous persistence for auth state. Implementations are best effort:
/// a failed read looks like an empty session and a failed write is logged, never
/// surfaced. Losing persisted state only costs the user a fresh login.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> PersistedSession;
    fn save(&self, session: &PersistedSession);
    fn clear(&self);
}

// 2. File-backed implementation for native clients.
/// FileTokenStorage
///
/// Keeps the session as a JSON document at `path`. A missing file is an empty
/// session; a corrupt one is treated as empty and overwritten on the next save.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> PersistedSession {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return PersistedSession::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read session file");
                return PersistedSession::default();
            }
        };

        serde_json::from_slice(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
            PersistedSession::default()
        })
    }

    fn save(&self, session: &PersistedSession) {
        let result = serde_json::to_vec_pretty(session)
            .map_err(std::io::Error::other)
            .and_then(|bytes| {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&self.path, bytes)
            });

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "could not write session file");
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove session file");
            }
        }
    }
}

// 3. In-memory implementation (tests, ephemeral sessions).
/// MemoryTokenStorage
///
/// Cloning shares the underlying slot, so a test can keep a handle and inspect
/// what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    slot: Arc<Mutex<PersistedSession>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            slot: Arc::new(Mutex::new(session)),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> PersistedSession {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn save(&self, session: &PersistedSession) {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session.clone();
    }

    fn clear(&self) {
        self.save(&PersistedSession::default());
    }
}

/// StorageState
///
/// The shared handle the auth store holds its persistence through.
pub type StorageState = Arc<dyn TokenStorage>;
