use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use coach_core::model::{CompletionRecord, SessionId};
use storage::repository::ResultsRepository;

use crate::error::SessionError;

/// Presentation-agnostic list item for a history screen.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The UI may format timestamps (e.g., relative time, locale) as needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryListItem {
    pub session_id: SessionId,
    pub completed_at: DateTime<Utc>,
    pub score: u32,
    pub passed: Option<bool>,
    pub time_spent_secs: u32,
}

impl HistoryListItem {
    #[must_use]
    pub fn from_record(record: &CompletionRecord) -> Self {
        Self {
            session_id: record.session_id,
            completed_at: record.date,
            score: record.score,
            passed: record.passed,
            time_spent_secs: record.time_spent_seconds,
        }
    }
}

/// Read-side queries over the completion history.
#[derive(Clone)]
pub struct HistoryService {
    results: Arc<dyn ResultsRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(results: Arc<dyn ResultsRepository>) -> Self {
        Self { results }
    }

    /// Most recent completions across all sessions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryListItem>, SessionError> {
        let records = self.results.all()?;
        Ok(records
            .iter()
            .take(limit)
            .map(HistoryListItem::from_record)
            .collect())
    }

    /// Completions for one session, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on repository failures.
    pub fn for_session(&self, id: SessionId) -> Result<Vec<HistoryListItem>, SessionError> {
        let records = self.results.for_session(id)?;
        Ok(records.iter().map(HistoryListItem::from_record).collect())
    }
}
