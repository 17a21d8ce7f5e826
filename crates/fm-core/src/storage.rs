//! Persistence boundary for completed sessions.
//!
//! The engine only sees this trait; concrete backends live outside the core.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::session::{Session, decode_sessions, encode_sessions};

#[derive(Debug)]
pub enum StorageError {
    /// The backend could not be read or written.
    Backend(String),
    /// Stored data exists but does not decode.
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Backend(msg) => write!(f, "storage backend error: {msg}"),
            StorageError::Corrupt(msg) => write!(f, "corrupt session data: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Synchronous storage for the ordered (most-recent-first) session list.
pub trait SessionStorage {
    /// Missing data is `Ok(vec![])`.
    fn load_sessions(&self) -> Result<Vec<Session>, StorageError>;
    /// Replace the stored list with `sessions`.
    fn save_sessions(&self, sessions: &[Session]) -> Result<(), StorageError>;
    /// Remove the stored list entirely.
    fn clear_sessions(&self) -> Result<(), StorageError>;
}

/// In-process storage holding the encoded list, so it exercises the same
/// wire shape as a real backend. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    raw: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with a raw stored value (possibly corrupt).
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Arc::new(Mutex::new(Some(raw.to_string()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load_sessions(&self) -> Result<Vec<Session>, StorageError> {
        match self.raw() {
            Some(raw) => decode_sessions(&raw).map_err(|e| StorageError::Corrupt(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn save_sessions(&self, sessions: &[Session]) -> Result<(), StorageError> {
        let encoded =
            encode_sessions(sessions).map_err(|e| StorageError::Backend(e.to_string()))?;
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }

    fn clear_sessions(&self) -> Result<(), StorageError> {
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
