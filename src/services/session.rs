//! Session token handling.
//!
//! A [`Session`] is the one place the bearer token lives. It is cloned into
//! every call site that needs authentication; [`Session::logout`] is the single
//! teardown that clears both the in-memory copy and the persisted copy.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Fixed key the token is stored under
pub const TOKEN_KEY: &str = "token";

/// Errors raised by persistent token storage
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistent storage for the session token
pub trait TokenStore: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Key/value JSON file, the on-disk stand-in for browser local storage
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, SessionError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Map::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut entries = self.read_entries()?;
        if entries.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            fs::remove_file(&self.path)?;
            Ok(())
        } else {
            self.write_entries(&entries)
        }
    }
}

/// Token store that forgets everything when dropped
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

struct SessionInner {
    token: RwLock<Option<String>>,
    store: Box<dyn TokenStore>,
}

/// Shared handle to the current bearer token
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the token itself
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("store", &self.inner.store)
            .finish()
    }
}

impl Session {
    /// Restore a session from persistent storage
    ///
    /// An unreadable store starts the session logged out.
    pub fn restore(store: impl TokenStore + 'static) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read persisted session, starting logged out");
                None
            }
        };
        debug!(authenticated = token.is_some(), "Session restored");

        Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(token),
                store: Box::new(store),
            }),
        }
    }

    /// A session that is never persisted
    pub fn in_memory() -> Self {
        Self::restore(MemoryTokenStore::default())
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Adopt a freshly issued token and persist it
    ///
    /// The in-memory session is updated even when persisting fails.
    pub fn establish(&self, token: &str) -> Result<(), SessionError> {
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        self.inner.store.save(token)
    }

    /// Clear the token everywhere
    pub fn logout(&self) {
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Could not clear persisted session token");
        }
        debug!("Session cleared");
    }
}
