use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use coach_core::model::{CompletionRecord, SessionId};
use storage::repository::ResultsRepository;

use crate::error::SessionError;

/// Derived aggregates recomputed after every completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    /// Best historical score for the session just completed.
    pub best_score: u32,
    /// Every session id with at least one completion.
    pub completed: BTreeSet<SessionId>,
    /// Consecutive-calendar-day streak ending at the latest completion.
    pub streak: u32,
}

/// Archives completion records and recomputes derived aggregates.
///
/// History is append-only; retaking a session never removes or mutates
/// earlier records.
#[derive(Clone)]
pub struct CompletionRecorder {
    results: Arc<dyn ResultsRepository>,
}

impl CompletionRecorder {
    #[must_use]
    pub fn new(results: Arc<dyn ResultsRepository>) -> Self {
        Self { results }
    }

    /// Append a record, then recompute aggregates over the full history.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the repository fails; the
    /// record is not retried.
    pub fn record(&self, record: &CompletionRecord) -> Result<Aggregates, SessionError> {
        self.results.append(record)?;
        let history = self.results.all()?;
        Ok(aggregates(record.session_id, &history))
    }
}

/// Recompute aggregates from a most-recent-first history.
fn aggregates(session_id: SessionId, history: &[CompletionRecord]) -> Aggregates {
    let best_score = history
        .iter()
        .filter(|record| record.session_id == session_id)
        .map(|record| record.score)
        .max()
        .unwrap_or(0);

    let completed = history.iter().map(|record| record.session_id).collect();

    Aggregates {
        best_score,
        completed,
        streak: streak(history),
    }
}

/// Consecutive-day streak policy: count distinct UTC calendar days,
/// newest first, while each is exactly one day before the previous.
/// Multiple completions on one day count once; any gap ends the streak.
fn streak(history: &[CompletionRecord]) -> u32 {
    let mut days: Vec<NaiveDate> = history
        .iter()
        .map(|record| record.date.date_naive())
        .collect();
    days.sort_unstable();
    days.dedup();

    let mut streak = 0_u32;
    let mut expected: Option<NaiveDate> = None;
    for day in days.into_iter().rev() {
        match expected {
            None => streak = 1,
            Some(previous) if previous.pred_opt() == Some(day) => streak += 1,
            Some(_) => break,
        }
        expected = Some(day);
    }
    streak
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
