use crate::model::ids::{ItemId, SessionId};
use crate::model::item::Item;

/// Whether a session is scored as an assessment or a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Knowledge assessment: percentage score against a pass threshold.
    Assessment { pass_threshold: u8 },
    /// Physical-exercise session: score is the sum of reward points.
    Workout,
}

impl SessionKind {
    #[must_use]
    pub fn pass_threshold(&self) -> Option<u8> {
        match self {
            SessionKind::Assessment { pass_threshold } => Some(*pass_threshold),
            SessionKind::Workout => None,
        }
    }
}

/// Immutable definition of a session: an ordered item sequence plus
/// its scoring mode and optional overall time limit.
///
/// Definitions come from a `SessionCatalog` and are never mutated by a
/// run; an empty item list is representable but rejected at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefinition {
    id: SessionId,
    title: String,
    kind: SessionKind,
    items: Vec<Item>,
    time_limit_secs: Option<u32>,
}

impl SessionDefinition {
    #[must_use]
    pub fn new(id: SessionId, title: impl Into<String>, kind: SessionKind, items: Vec<Item>) -> Self {
        Self {
            id,
            title: title.into(),
            kind,
            items,
            time_limit_secs: None,
        }
    }

    /// Attach an overall time limit. Carried for the UI countdown; the
    /// engine does not enforce it.
    #[must_use]
    pub fn with_time_limit(mut self, secs: u32) -> Self {
        self.time_limit_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u32> {
        self.time_limit_secs
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Find an item by id, with its position in the sequence.
    #[must_use]
    pub fn find(&self, id: ItemId) -> Option<(usize, &Item)> {
        self.items
            .iter()
            .enumerate()
            .find(|(_, item)| item.id() == id)
    }

    /// Number of question items (the scoring denominator for assessments).
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_question()).count()
    }
}
