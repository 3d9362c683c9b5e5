//! Session persistence.
//!
//! The session is two entries under stable keys in one directory: the opaque
//! bearer token (`token`) and the JSON user profile (`user.json`). They are
//! written and cleared together.
//!
//! Reads never fail. A missing or corrupt entry yields an empty [`Session`]
//! and a warning in the log.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// File holding the JSON user profile.
pub const USER_KEY: &str = "user.json";

// ============================================================================
// Session types
// ============================================================================

/// Profile of the logged-in user, as returned by the login endpoint.
///
/// Only `id` and `is_admin` are interpreted; everything else is kept
/// verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn new(id: i64, is_admin: bool) -> Self {
        Self {
            id,
            is_admin,
            extra: serde_json::Map::new(),
        }
    }

    pub fn nickname(&self) -> Option<&str> {
        self.extra.get("nickname").and_then(|v| v.as_str())
    }
}

/// Persisted authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    /// True when a non-empty token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

// ============================================================================
// SessionStore Trait
// ============================================================================

/// Storage for the current session.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Persist the token and profile together.
    fn save(&self, token: &str, user: &UserProfile) -> Result<()>;

    /// Last saved session, or an empty one.
    fn load(&self) -> Session;

    /// Remove both entries. Idempotent.
    fn clear(&self);

    /// Current non-empty token, read fresh.
    fn token(&self) -> Option<String> {
        self.load().token.filter(|t| !t.is_empty())
    }
}

/// Session store shared between the client and the auth flow.
pub type SharedSessionStore = Arc<dyn SessionStore>;

// ============================================================================
// FileSessionStore
// ============================================================================

/// File-backed store that survives restarts.
#[derive(Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
    io_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_KEY)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_KEY)
    }

    fn read_entry(path: &Path) -> std::io::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn try_load(&self) -> std::result::Result<Session, String> {
        let token = Self::read_entry(&self.token_path())
            .map_err(|e| format!("failed to read token: {}", e))?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let user = match Self::read_entry(&self.user_path())
            .map_err(|e| format!("failed to read user profile: {}", e))?
        {
            Some(json) => Some(
                serde_json::from_str::<UserProfile>(&json)
                    .map_err(|e| format!("failed to parse user profile: {}", e))?,
            ),
            None => None,
        };

        Ok(Session { token, user })
    }

    fn remove_entry(path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove session entry"),
        }
    }

    fn remove_all(&self) {
        Self::remove_entry(&self.token_path());
        Self::remove_entry(&self.user_path());
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, token: &str, user: &UserProfile) -> Result<()> {
        let _guard = self.io_lock.lock();

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Session(format!("Failed to create session directory: {}", e)))?;

        let user_json = serde_json::to_string_pretty(user)?;

        // Stage both entries before touching the live ones.
        let token_tmp = self.dir.join(format!("{}.tmp", TOKEN_KEY));
        let user_tmp = self.dir.join(format!("{}.tmp", USER_KEY));
        std::fs::write(&token_tmp, token)
            .map_err(|e| Error::Session(format!("Failed to write token: {}", e)))?;
        if let Err(e) = std::fs::write(&user_tmp, user_json) {
            Self::remove_entry(&token_tmp);
            return Err(Error::Session(format!("Failed to write user profile: {}", e)));
        }

        let committed = std::fs::rename(&user_tmp, self.user_path())
            .and_then(|()| std::fs::rename(&token_tmp, self.token_path()));
        if let Err(e) = committed {
            // Never leave a new profile next to an old token.
            self.remove_all();
            Self::remove_entry(&token_tmp);
            Self::remove_entry(&user_tmp);
            return Err(Error::Session(format!("Failed to commit session: {}", e)));
        }

        tracing::info!(user_id = user.id, "Session saved to {}", self.dir.display());
        Ok(())
    }

    fn load(&self) -> Session {
        let _guard = self.io_lock.lock();
        match self.try_load() {
            Ok(session) => session,
            Err(reason) => {
                tracing::warn!(dir = %self.dir.display(), "{}; treating as logged out", reason);
                Session::default()
            }
        }
    }

    fn clear(&self) {
        let _guard = self.io_lock.lock();
        self.remove_all();
        tracing::info!("Session cleared");
    }
}

// ============================================================================
// InMemorySessionStore (for testing)
// ============================================================================

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: RwLock<Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            session: RwLock::new(Session {
                token: Some(token.into()),
                user: Some(user),
            }),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, token: &str, user: &UserProfile) -> Result<()> {
        *self.session.write() = Session {
            token: Some(token.to_string()),
            user: Some(user.clone()),
        };
        Ok(())
    }

    fn load(&self) -> Session {
        self.session.read().clone()
    }

    fn clear(&self) {
        *self.session.write() = Session::default();
    }
}

/// Create a shared file-backed session store.
pub fn create_session_store(dir: &Path) -> SharedSessionStore {
    Arc::new(FileSessionStore::new(dir))
}

/// Create a shared in-memory session store (for testing).
pub fn create_memory_session_store() -> SharedSessionStore {
    Arc::new(InMemorySessionStore::new())
}
