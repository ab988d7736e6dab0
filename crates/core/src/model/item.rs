use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::model::ids::ItemId;
use crate::model::response::Response;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised while constructing items from catalog content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("correct option index {index} is outside the {options} available options")]
    KeyIndexOutOfRange { index: usize, options: usize },

    #[error("a choice question needs at least two options, got {0}")]
    TooFewOptions(usize),

    #[error("a multi-select key must name at least one correct option")]
    EmptyKey,
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// The kind of a question, without its correct-answer payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    SingleChoice,
    MultiSelect,
    Boolean,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestionKind::SingleChoice => "single-choice",
            QuestionKind::MultiSelect => "multi-select",
            QuestionKind::Boolean => "boolean",
        };
        write!(f, "{name}")
    }
}

/// Correct-answer specification for a question.
///
/// The key determines both the question kind and the correctness rule:
/// - `SingleChoice`: the response must equal the correct option index.
/// - `MultiSelect`: the response set must exactly equal the correct set.
///   No subset, no superset, order irrelevant. There is no partial credit.
/// - `Boolean`: the response must equal the correct flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    SingleChoice { correct: usize },
    MultiSelect { correct: BTreeSet<usize> },
    Boolean { correct: bool },
}

impl AnswerKey {
    /// Returns the question kind this key implies.
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerKey::SingleChoice { .. } => QuestionKind::SingleChoice,
            AnswerKey::MultiSelect { .. } => QuestionKind::MultiSelect,
            AnswerKey::Boolean { .. } => QuestionKind::Boolean,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single knowledge-assessment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: ItemId,
    prompt: String,
    options: Vec<String>,
    key: AnswerKey,
    explanation: Option<String>,
}

impl Question {
    /// Create a question, validating the key against the option list.
    ///
    /// Boolean questions carry no options; choice questions need at least
    /// two, and every index named by the key must point at one of them.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` when the key and options disagree.
    pub fn new(
        id: ItemId,
        prompt: impl Into<String>,
        options: Vec<String>,
        key: AnswerKey,
        explanation: Option<String>,
    ) -> Result<Self, ItemError> {
        match &key {
            AnswerKey::SingleChoice { correct } => {
                if options.len() < 2 {
                    return Err(ItemError::TooFewOptions(options.len()));
                }
                if *correct >= options.len() {
                    return Err(ItemError::KeyIndexOutOfRange {
                        index: *correct,
                        options: options.len(),
                    });
                }
            }
            AnswerKey::MultiSelect { correct } => {
                if options.len() < 2 {
                    return Err(ItemError::TooFewOptions(options.len()));
                }
                if correct.is_empty() {
                    return Err(ItemError::EmptyKey);
                }
                if let Some(&index) = correct.iter().find(|&&i| i >= options.len()) {
                    return Err(ItemError::KeyIndexOutOfRange {
                        index,
                        options: options.len(),
                    });
                }
            }
            AnswerKey::Boolean { .. } => {}
        }

        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            key,
            explanation,
        })
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Ordered option texts; empty for boolean questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.key.kind()
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Applies the correctness rule for this question's kind.
    ///
    /// A response whose shape does not match the kind is simply incorrect;
    /// capture-time validation keeps such responses out of normal runs.
    #[must_use]
    pub fn is_correct(&self, response: &Response) -> bool {
        match (&self.key, response) {
            (AnswerKey::SingleChoice { correct }, Response::Choice(picked)) => picked == correct,
            (AnswerKey::MultiSelect { correct }, Response::Selection(picked)) => picked == correct,
            (AnswerKey::Boolean { correct }, Response::Flag(picked)) => picked == correct,
            _ => false,
        }
    }
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// A single physical-exercise step.
///
/// Exercises carry no correctness rule; reaching the next step is success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    id: ItemId,
    name: String,
    instructions: String,
    target_secs: u32,
    reward_points: u32,
}

impl Exercise {
    #[must_use]
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        instructions: impl Into<String>,
        target_secs: u32,
        reward_points: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            instructions: instructions.into(),
            target_secs,
            reward_points,
        }
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Target duration in seconds.
    #[must_use]
    pub fn target_secs(&self) -> u32 {
        self.target_secs
    }

    #[must_use]
    pub fn reward_points(&self) -> u32 {
        self.reward_points
    }
}

//
// ─── ITEM ──────────────────────────────────────────────────────────────────────
//

/// One step within a session, either a question or an exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Question(Question),
    Exercise(Exercise),
}

impl Item {
    #[must_use]
    pub fn id(&self) -> ItemId {
        match self {
            Item::Question(q) => q.id(),
            Item::Exercise(e) => e.id(),
        }
    }

    #[must_use]
    pub fn is_question(&self) -> bool {
        matches!(self, Item::Question(_))
    }

    #[must_use]
    pub fn as_question(&self) -> Option<&Question> {
        match self {
            Item::Question(q) => Some(q),
            Item::Exercise(_) => None,
        }
    }

    #[must_use]
    pub fn as_exercise(&self) -> Option<&Exercise> {
        match self {
            Item::Question(_) => None,
            Item::Exercise(e) => Some(e),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("option {i}")).collect()
    }

    fn single_choice(correct: usize) -> Question {
        Question::new(
            ItemId::new(1),
            "Which drill?",
            options(4),
            AnswerKey::SingleChoice { correct },
            None,
        )
        .unwrap()
    }

    fn multi_select(correct: &[usize]) -> Question {
        Question::new(
            ItemId::new(2),
            "Pick all that apply",
            options(5),
            AnswerKey::MultiSelect {
                correct: correct.iter().copied().collect(),
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn single_choice_matches_exact_index() {
        let q = single_choice(2);
        assert!(q.is_correct(&Response::Choice(2)));
        assert!(!q.is_correct(&Response::Choice(1)));
    }

    #[test]
    fn multi_select_requires_exact_set() {
        let q = multi_select(&[0, 1, 2, 4]);
        let exact: BTreeSet<usize> = [0, 1, 2, 4].into_iter().collect();
        let subset: BTreeSet<usize> = [0, 1, 2].into_iter().collect();
        let superset: BTreeSet<usize> = [0, 1, 2, 3, 4].into_iter().collect();

        assert!(q.is_correct(&Response::Selection(exact)));
        assert!(!q.is_correct(&Response::Selection(subset)));
        assert!(!q.is_correct(&Response::Selection(superset)));
    }

    #[test]
    fn boolean_matches_flag() {
        let q = Question::new(
            ItemId::new(3),
            "Stretch before lifting?",
            Vec::new(),
            AnswerKey::Boolean { correct: true },
            Some("Warm muscles first.".into()),
        )
        .unwrap();

        assert!(q.is_correct(&Response::Flag(true)));
        assert!(!q.is_correct(&Response::Flag(false)));
        assert_eq!(q.explanation(), Some("Warm muscles first."));
    }

    #[test]
    fn mismatched_response_shape_is_incorrect() {
        let q = single_choice(0);
        assert!(!q.is_correct(&Response::Flag(true)));
        assert!(!q.is_correct(&Response::Selection(BTreeSet::new())));
    }

    #[test]
    fn key_index_outside_options_is_rejected() {
        let err = Question::new(
            ItemId::new(4),
            "Bad key",
            options(3),
            AnswerKey::SingleChoice { correct: 3 },
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ItemError::KeyIndexOutOfRange {
                index: 3,
                options: 3
            }
        ));
    }

    #[test]
    fn choice_question_needs_options() {
        let err = Question::new(
            ItemId::new(5),
            "No options",
            Vec::new(),
            AnswerKey::MultiSelect {
                correct: [0].into_iter().collect(),
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ItemError::TooFewOptions(0)));
    }

    #[test]
    fn item_dispatch_exposes_id_and_kind() {
        let item = Item::Exercise(Exercise::new(ItemId::new(7), "Plank", "Hold it", 60, 15));
        assert_eq!(item.id(), ItemId::new(7));
        assert!(!item.is_question());
        assert_eq!(item.as_exercise().unwrap().reward_points(), 15);
    }
}
