use crate::constants::MAX_SESSIONS;
use crate::session::Session;
use crate::storage::{MemoryStorage, SessionStorage};

/// Completed sessions, most-recent-first, bounded to `MAX_SESSIONS`.
///
/// Every mutation is written through to the backing storage before the
/// call returns. Storage failures are logged and never surface: a history
/// that cannot be read starts empty, one that cannot be written keeps
/// working in memory.
pub struct SessionHistory {
    sessions: Vec<Session>,
    storage: Box<dyn SessionStorage>,
    capacity: usize,
}

impl SessionHistory {
    /// Load persisted sessions. Missing or corrupt data yields an empty history.
    pub fn load(storage: Box<dyn SessionStorage>) -> Self {
        let mut sessions = match storage.load_sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!("failed to load sessions: {e}");
                Vec::new()
            }
        };
        sessions.truncate(MAX_SESSIONS);
        Self {
            sessions,
            storage,
            capacity: MAX_SESSIONS,
        }
    }

    /// Fresh history over a private in-memory store.
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::new()))
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Most recently completed session.
    pub fn latest(&self) -> Option<&Session> {
        self.sessions.first()
    }

    /// Highest stored id, used to keep new ids monotonic across restarts.
    pub fn max_id(&self) -> Option<i64> {
        self.sessions.iter().map(|s| s.id).max()
    }

    /// Prepend, evict beyond capacity, persist.
    pub fn insert(&mut self, session: Session) {
        self.sessions.insert(0, session);
        if self.sessions.len() > self.capacity {
            let evicted = self.sessions.len() - self.capacity;
            self.sessions.truncate(self.capacity);
            tracing::debug!("evicted {evicted} oldest session(s)");
        }
        self.persist();
    }

    /// Remove exactly one session. Returns false (and writes nothing) if absent.
    pub fn delete(&mut self, id: i64) -> bool {
        let Some(idx) = self.sessions.iter().position(|s| s.id == id) else {
            return false;
        };
        self.sessions.remove(idx);
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        if let Err(e) = self.storage.clear_sessions() {
            tracing::error!("failed to clear persisted sessions: {e}");
        }
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save_sessions(&self.sessions) {
            tracing::error!("failed to save sessions: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    fn session(id: i64) -> Session {
        Session {
            id,
            name: format!("session-{id}"),
            date: String::new(),
            start_time: id,
            end_time: id,
            duration: 0,
            duration_text: "0s".to_string(),
            avg_bpm: 0,
            max_bpm: 0.0,
            max_stress: 0.0,
            bpm_history: Vec::new(),
            panic_events: Vec::new(),
            has_panic_event: false,
            panic_count: 0,
        }
    }

    fn ids(history: &SessionHistory) -> Vec<i64> {
        history.sessions().iter().map(|s| s.id).collect()
    }

    /// Storage whose every call fails.
    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn load_sessions(&self) -> Result<Vec<Session>, StorageError> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }
        fn save_sessions(&self, _: &[Session]) -> Result<(), StorageError> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }
        fn clear_sessions(&self) -> Result<(), StorageError> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_insert_is_most_recent_first() {
        let mut history = SessionHistory::in_memory();
        history.insert(session(1));
        history.insert(session(2));
        history.insert(session(3));
        assert_eq!(ids(&history), vec![3, 2, 1]);
        assert_eq!(history.latest().unwrap().id, 3);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = SessionHistory::in_memory();
        for id in 1..=51 {
            history.insert(session(id));
        }
        assert_eq!(history.len(), MAX_SESSIONS);
        assert_eq!(history.latest().unwrap().id, 51);
        assert_eq!(history.sessions().last().unwrap().id, 2);
        assert!(history.get(1).is_none());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = MemoryStorage::new();
        let mut history = SessionHistory::load(Box::new(storage.clone()));

        history.insert(session(1));
        history.insert(session(2));
        assert_eq!(storage.load_sessions().unwrap().len(), 2);

        history.delete(1);
        let stored = storage.load_sessions().unwrap();
        assert_eq!(stored.iter().map(|s| s.id).collect::<Vec<_>>(), vec![2]);

        history.clear();
        assert!(storage.raw().is_none());
    }

    #[test]
    fn test_reload_round_trips() {
        let storage = MemoryStorage::new();
        {
            let mut history = SessionHistory::load(Box::new(storage.clone()));
            history.insert(session(10));
            history.insert(session(20));
        }
        let reloaded = SessionHistory::load(Box::new(storage));
        assert_eq!(ids(&reloaded), vec![20, 10]);
        assert_eq!(reloaded.max_id(), Some(20));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let storage = MemoryStorage::new();
        let mut history = SessionHistory::load(Box::new(storage.clone()));
        history.insert(session(1));
        history.insert(session(2));
        let before = storage.raw();

        assert!(!history.delete(99));
        assert_eq!(ids(&history), vec![2, 1]);
        assert_eq!(storage.raw(), before);
    }

    #[test]
    fn test_delete_preserves_order_of_rest() {
        let mut history = SessionHistory::in_memory();
        for id in 1..=4 {
            history.insert(session(id));
        }
        assert!(history.delete(3));
        assert_eq!(ids(&history), vec![4, 2, 1]);
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let history = SessionHistory::load(Box::new(MemoryStorage::with_raw("garbage")));
        assert!(history.is_empty());
    }

    #[test]
    fn test_oversized_storage_is_truncated_on_load() {
        let storage = MemoryStorage::new();
        let many: Vec<Session> = (0..60).rev().map(session).collect();
        storage.save_sessions(&many).unwrap();

        let history = SessionHistory::load(Box::new(storage));
        assert_eq!(history.len(), MAX_SESSIONS);
        assert_eq!(history.latest().unwrap().id, 59);
    }

    #[test]
    fn test_broken_storage_never_panics() {
        let mut history = SessionHistory::load(Box::new(BrokenStorage));
        assert!(history.is_empty());
        history.insert(session(1));
        assert_eq!(history.len(), 1);
        assert!(history.delete(1));
        history.insert(session(2));
        history.clear();
        assert!(history.is_empty());
    }
}
