use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use coach_core::model::{CompletionRecord, SessionDefinition, SessionId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read-only source of session definitions (the content catalog).
///
/// The engine never reaches for ambient shared state; a catalog is
/// always injected by the caller.
pub trait SessionCatalog: Send + Sync {
    /// Fetch a session definition by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    fn definition(&self, id: SessionId) -> Result<SessionDefinition, StorageError>;

    /// List all available session ids.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be read.
    fn session_ids(&self) -> Result<Vec<SessionId>, StorageError>;
}

/// Append-only store of completion records.
///
/// History reads are most-recent-first. Appending never mutates or
/// removes earlier records; retakes simply add more.
pub trait ResultsRepository: Send + Sync {
    /// Append a completion record to the history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    fn append(&self, record: &CompletionRecord) -> Result<(), StorageError>;

    /// All records, most-recent-first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read.
    fn all(&self) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Records for one session, most-recent-first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read.
    fn for_session(&self, id: SessionId) -> Result<Vec<CompletionRecord>, StorageError>;
}

/// Simple in-memory catalog for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    definitions: Arc<Mutex<HashMap<SessionId, SessionDefinition>>>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the catalog lock is poisoned.
    pub fn insert(&self, definition: SessionDefinition) -> Result<(), StorageError> {
        let mut guard = self
            .definitions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(definition.id(), definition);
        Ok(())
    }
}

impl SessionCatalog for InMemoryCatalog {
    fn definition(&self, id: SessionId) -> Result<SessionDefinition, StorageError> {
        let guard = self
            .definitions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    fn session_ids(&self) -> Result<Vec<SessionId>, StorageError> {
        let guard = self
            .definitions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut ids: Vec<SessionId> = guard.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

/// Simple in-memory results store for testing and prototyping.
///
/// Records are kept in append order; reads reverse to most-recent-first.
#[derive(Clone, Default)]
pub struct InMemoryResults {
    records: Arc<Mutex<Vec<CompletionRecord>>>,
}

impl InMemoryResults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultsRepository for InMemoryResults {
    fn append(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(record.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().rev().cloned().collect())
    }

    fn for_session(&self, id: SessionId) -> Result<Vec<CompletionRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .rev()
            .filter(|record| record.session_id == id)
            .cloned()
            .collect())
    }
}

/// Aggregates the catalog and results stores behind trait objects for
/// easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn SessionCatalog>,
    pub results: Arc<dyn ResultsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let catalog: Arc<dyn SessionCatalog> = Arc::new(InMemoryCatalog::new());
        let results: Arc<dyn ResultsRepository> = Arc::new(InMemoryResults::new());
        Self { catalog, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use coach_core::model::{AnswerKey, Item, ItemId, Question, SessionKind};
    use coach_core::time::fixed_now;

    fn build_definition(id: u64) -> SessionDefinition {
        let question = Question::new(
            ItemId::new(1),
            "Q",
            vec!["a".into(), "b".into()],
            AnswerKey::SingleChoice { correct: 0 },
            None,
        )
        .unwrap();
        SessionDefinition::new(
            SessionId::new(id),
            format!("Session {id}"),
            SessionKind::Assessment { pass_threshold: 80 },
            vec![Item::Question(question)],
        )
    }

    fn build_record(session: u64, at_offset_secs: i64, score: u32) -> CompletionRecord {
        CompletionRecord {
            session_id: SessionId::new(session),
            date: fixed_now() + Duration::seconds(at_offset_secs),
            score,
            passed: Some(score >= 80),
            quality: None,
            time_spent_seconds: 12,
            per_item: Vec::new(),
        }
    }

    #[test]
    fn catalog_round_trips_definitions() {
        let catalog = InMemoryCatalog::new();
        catalog.insert(build_definition(1)).unwrap();
        catalog.insert(build_definition(2)).unwrap();

        let fetched = catalog.definition(SessionId::new(2)).unwrap();
        assert_eq!(fetched.title(), "Session 2");
        assert_eq!(
            catalog.session_ids().unwrap(),
            vec![SessionId::new(1), SessionId::new(2)]
        );
    }

    #[test]
    fn missing_definition_is_not_found() {
        let catalog = InMemoryCatalog::new();
        let err = catalog.definition(SessionId::new(9)).unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[test]
    fn history_reads_most_recent_first() {
        let results = InMemoryResults::new();
        results.append(&build_record(1, 0, 60)).unwrap();
        results.append(&build_record(2, 10, 80)).unwrap();
        results.append(&build_record(1, 20, 100)).unwrap();

        let all = results.all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].score, 100);
        assert_eq!(all[2].score, 60);

        let for_one = results.for_session(SessionId::new(1)).unwrap();
        assert_eq!(for_one.len(), 2);
        assert_eq!(for_one[0].score, 100);
    }
}
