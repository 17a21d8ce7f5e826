use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use fm_core::{
    SESSIONS_KEY, SETTINGS_KEY, Session, SessionStorage, StorageError, decode_sessions,
    encode_sessions,
};

use crate::error::Result;
use crate::schema;
use crate::settings::Settings;

/// One SQLite database holding a profile's sessions and settings as
/// JSON values in the `metadata` table.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // --- Key/value ---

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Returns whether the key existed.
    pub fn remove_value(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM metadata WHERE key = ?1", [key])?;
        Ok(removed > 0)
    }

    // --- Sessions ---

    pub fn load_session_list(&self) -> Result<Vec<Session>> {
        match self.get_value(SESSIONS_KEY)? {
            Some(raw) => Ok(decode_sessions(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn save_session_list(&self, sessions: &[Session]) -> Result<()> {
        let encoded = encode_sessions(sessions)?;
        self.set_value(SESSIONS_KEY, &encoded)
    }

    // --- Settings ---

    /// Stored settings merged over defaults. An undecodable value is
    /// replaced by defaults rather than failing the caller.
    pub fn load_settings(&self) -> Result<Settings> {
        let Some(raw) = self.get_value(SETTINGS_KEY)? else {
            return Ok(Settings::default());
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!("stored settings unreadable, using defaults: {e}");
                Ok(Settings::default())
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let encoded = serde_json::to_string(settings)?;
        self.set_value(SETTINGS_KEY, &encoded)
    }
}

impl SessionStorage for Store {
    fn load_sessions(&self) -> std::result::Result<Vec<Session>, StorageError> {
        Ok(self.load_session_list()?)
    }

    fn save_sessions(&self, sessions: &[Session]) -> std::result::Result<(), StorageError> {
        Ok(self.save_session_list(sessions)?)
    }

    fn clear_sessions(&self) -> std::result::Result<(), StorageError> {
        self.remove_value(SESSIONS_KEY)?;
        Ok(())
    }
}
