use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ItemId, SessionId};
use crate::model::response::Response;

/// Outcome of a single item within a finished session.
///
/// `correct` is present for questions only; exercises carry neither a
/// response nor a correctness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    pub item_id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<Response>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correct: Option<bool>,
}

/// Immutable outcome of one finished session.
///
/// Serializes to the persisted history document shape
/// (`sessionId`, `date`, `score`, `passed`, `timeSpentSeconds`, `perItem`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub session_id: SessionId,
    pub date: DateTime<Utc>,
    /// Assessments: 0–100 percentage. Workouts: total reward points.
    pub score: u32,
    /// Assessments only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub passed: Option<bool>,
    /// Workouts only: deterministic on-pace measure in [80, 100].
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quality: Option<u8>,
    pub time_spent_seconds: u32,
    pub per_item: Vec<ItemOutcome>,
}

impl CompletionRecord {
    /// Number of items marked correct in the breakdown.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.per_item
            .iter()
            .filter(|outcome| outcome.correct == Some(true))
            .count()
    }
}
