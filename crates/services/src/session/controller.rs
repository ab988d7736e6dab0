use chrono::{DateTime, Utc};
use std::fmt;

use coach_core::model::{
    CompletionRecord, Item, ItemId, Response, RunStatus, SessionDefinition, SessionRun,
    StepOutcome,
};

use super::capture;
use super::progress::SessionProgress;
use super::scoring;
use crate::error::SessionError;

/// Result of advancing past the current item.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Moved on to the next item.
    Continued,
    /// The session finished; scoring has run exactly once.
    Finished(CompletionRecord),
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// State machine orchestrating one traversal of a session definition.
///
/// The controller exclusively owns its `SessionRun` and never performs
/// I/O; every operation runs to completion on the caller's thread.
/// Timestamps are injected so behavior stays deterministic under a
/// fixed clock.
pub struct SessionController {
    definition: SessionDefinition,
    run: SessionRun,
}

impl SessionController {
    /// Create a controller for a definition; the run starts NotStarted.
    #[must_use]
    pub fn new(definition: SessionDefinition, started_at: DateTime<Utc>) -> Self {
        let run = SessionRun::new(definition.id(), definition.item_count(), started_at);
        Self { definition, run }
    }

    #[must_use]
    pub fn definition(&self) -> &SessionDefinition {
        &self.definition
    }

    #[must_use]
    pub fn run(&self) -> &SessionRun {
        &self.run
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.run.status()
    }

    /// The item currently presented, if the run is live.
    #[must_use]
    pub fn current_item(&self) -> Option<&Item> {
        match self.run.status() {
            RunStatus::InProgress | RunStatus::Paused => {
                self.definition.item(self.run.current_index())
            }
            _ => None,
        }
    }

    /// Progress snapshot for the UI indicator.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            current: self.run.current_index(),
            total: self.definition.item_count(),
            elapsed_secs: self.run.elapsed_secs(),
            status: self.run.status(),
        }
    }

    /// NotStarted → InProgress with a cleared run.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySession` for a zero-item definition and
    /// `SessionError::InvalidTransition` if already started.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.run.begin()?;
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.run.status() == RunStatus::InProgress {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                status: self.run.status(),
            })
        }
    }

    /// Locate the current item, classifying a stray id as unknown or
    /// out of turn.
    fn current_item_checked(&self, item_id: ItemId) -> Result<&Item, SessionError> {
        let current = self
            .definition
            .item(self.run.current_index())
            .ok_or(SessionError::UnknownItem(item_id))?;
        if current.id() == item_id {
            return Ok(current);
        }
        if self.definition.find(item_id).is_some() {
            Err(SessionError::NotCurrentItem(item_id))
        } else {
            Err(SessionError::UnknownItem(item_id))
        }
    }

    /// Submit a response for the current item (last write wins).
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless InProgress, `UnknownItem` /
    /// `NotCurrentItem` for a stray id, `NotAQuestion` for an exercise,
    /// and validation errors for an ill-shaped response.
    pub fn submit(&mut self, item_id: ItemId, response: Response) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        let item = self.current_item_checked(item_id)?;
        let question = item
            .as_question()
            .ok_or(SessionError::NotAQuestion(item_id))?;
        capture::validate_response(question, &response)?;
        self.run.record_response(item_id, response)?;
        Ok(())
    }

    /// Toggle one option of the current multi-select question.
    ///
    /// Re-toggling is an idempotent no-op pair; the resulting set, empty
    /// or not, is recorded as the submitted response.
    ///
    /// # Errors
    ///
    /// Same guards as `submit`, plus `ResponseKindMismatch` when the
    /// current question is not multi-select.
    pub fn toggle_option(&mut self, item_id: ItemId, index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        let item = self.current_item_checked(item_id)?;
        let question = item
            .as_question()
            .ok_or(SessionError::NotAQuestion(item_id))?;
        let picked = capture::toggled_selection(self.run.responses().get(item_id), index);
        capture::validate_response(question, &Response::Selection(picked.clone()))?;
        self.run.record_response(item_id, Response::Selection(picked))?;
        Ok(())
    }

    /// Advance past the current item; the final advance scores the run.
    ///
    /// A question blocks the advance until a response has been submitted
    /// for it (an empty submitted set does not block); an exercise never
    /// blocks.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless InProgress and
    /// `ResponseRequired` for an unanswered question.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        self.ensure_in_progress()?;
        if let Some(item) = self.definition.item(self.run.current_index()) {
            if item.is_question() && !self.run.responses().contains(item.id()) {
                return Err(SessionError::ResponseRequired(item.id()));
            }
        }

        match self.run.advance()? {
            StepOutcome::Moved => Ok(Advance::Continued),
            StepOutcome::Finished => {
                let record = scoring::score_session(
                    &self.definition,
                    self.run.responses(),
                    self.run.elapsed_secs(),
                    now,
                );
                Ok(Advance::Finished(record))
            }
        }
    }

    /// InProgress → Paused; elapsed time stops accumulating.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless InProgress.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.run.pause()?;
        Ok(())
    }

    /// Paused → InProgress.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless Paused.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.run.resume()?;
        Ok(())
    }

    /// Feed one delta from the external periodic clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` before start or after a
    /// terminal transition.
    pub fn tick(&mut self, delta_secs: u32) -> Result<(), SessionError> {
        self.run.tick(delta_secs)?;
        Ok(())
    }

    /// Abandon the run from any non-terminal state; no record is produced.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` once terminal.
    pub fn abandon(&mut self) -> Result<(), SessionError> {
        self.run.abandon()?;
        Ok(())
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("session_id", &self.definition.id())
            .field("item_count", &self.definition.item_count())
            .field("current", &self.run.current_index())
            .field("elapsed_secs", &self.run.elapsed_secs())
            .field("status", &self.run.status())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::model::{AnswerKey, Exercise, Question, SessionId, SessionKind};
    use coach_core::time::fixed_now;

    fn quiz() -> SessionDefinition {
        let options: Vec<String> = (0..5).map(|i| format!("o{i}")).collect();
        SessionDefinition::new(
            SessionId::new(1),
            "Quiz",
            SessionKind::Assessment { pass_threshold: 80 },
            vec![
                Item::Question(
                    Question::new(
                        ItemId::new(1),
                        "single",
                        options.clone(),
                        AnswerKey::SingleChoice { correct: 2 },
                        None,
                    )
                    .unwrap(),
                ),
                Item::Question(
                    Question::new(
                        ItemId::new(2),
                        "multi",
                        options,
                        AnswerKey::MultiSelect {
                            correct: [0, 1].into_iter().collect(),
                        },
                        None,
                    )
                    .unwrap(),
                ),
            ],
        )
    }

    fn started(def: SessionDefinition) -> SessionController {
        let mut controller = SessionController::new(def, fixed_now());
        controller.start().unwrap();
        controller
    }

    #[test]
    fn start_rejects_empty_definition() {
        let def = SessionDefinition::new(
            SessionId::new(9),
            "Empty",
            SessionKind::Workout,
            Vec::new(),
        );
        let mut controller = SessionController::new(def, fixed_now());
        assert!(matches!(
            controller.start().unwrap_err(),
            SessionError::EmptySession
        ));
    }

    #[test]
    fn submit_is_limited_to_the_current_item() {
        let mut controller = started(quiz());

        let err = controller
            .submit(ItemId::new(2), Response::Choice(0))
            .unwrap_err();
        assert!(matches!(err, SessionError::NotCurrentItem(id) if id == ItemId::new(2)));

        let err = controller
            .submit(ItemId::new(99), Response::Choice(0))
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownItem(id) if id == ItemId::new(99)));

        controller
            .submit(ItemId::new(1), Response::Choice(2))
            .unwrap();
    }

    #[test]
    fn submit_while_paused_is_an_invalid_transition() {
        let mut controller = started(quiz());
        controller.pause().unwrap();
        let err = controller
            .submit(ItemId::new(1), Response::Choice(2))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                status: RunStatus::Paused
            }
        ));
    }

    #[test]
    fn resubmission_overwrites_the_previous_response() {
        let mut controller = started(quiz());
        controller
            .submit(ItemId::new(1), Response::Choice(0))
            .unwrap();
        controller
            .submit(ItemId::new(1), Response::Choice(2))
            .unwrap();
        assert_eq!(
            controller.run().responses().get(ItemId::new(1)),
            Some(&Response::Choice(2))
        );
    }

    #[test]
    fn advance_blocks_until_a_question_is_answered() {
        let mut controller = started(quiz());
        let err = controller.advance(fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::ResponseRequired(id) if id == ItemId::new(1)));

        controller
            .submit(ItemId::new(1), Response::Choice(2))
            .unwrap();
        assert_eq!(controller.advance(fixed_now()).unwrap(), Advance::Continued);
        assert_eq!(controller.current_item().unwrap().id(), ItemId::new(2));
    }

    #[test]
    fn toggled_empty_set_unblocks_the_advance() {
        let mut controller = started(quiz());
        controller
            .submit(ItemId::new(1), Response::Choice(2))
            .unwrap();
        controller.advance(fixed_now()).unwrap();

        // toggle on, then off again: empty set, but submitted
        controller.toggle_option(ItemId::new(2), 1).unwrap();
        controller.toggle_option(ItemId::new(2), 1).unwrap();
        assert_eq!(
            controller
                .run()
                .responses()
                .get(ItemId::new(2))
                .and_then(Response::as_selection)
                .map(std::collections::BTreeSet::len),
            Some(0)
        );

        let outcome = controller.advance(fixed_now()).unwrap();
        assert!(matches!(outcome, Advance::Finished(_)));
        assert_eq!(controller.status(), RunStatus::Completed);
    }

    #[test]
    fn exercises_never_block_and_take_no_response() {
        let def = SessionDefinition::new(
            SessionId::new(2),
            "Workout",
            SessionKind::Workout,
            vec![Item::Exercise(Exercise::new(
                ItemId::new(1),
                "Plank",
                "Hold",
                60,
                10,
            ))],
        );
        let mut controller = started(def);

        let err = controller
            .submit(ItemId::new(1), Response::Flag(true))
            .unwrap_err();
        assert!(matches!(err, SessionError::NotAQuestion(_)));

        let outcome = controller.advance(fixed_now()).unwrap();
        let Advance::Finished(record) = outcome else {
            panic!("expected the workout to finish");
        };
        assert_eq!(record.score, 10);
    }

    #[test]
    fn final_advance_scores_the_run() {
        let mut controller = started(quiz());
        controller.tick(7).unwrap();
        controller
            .submit(ItemId::new(1), Response::Choice(2))
            .unwrap();
        controller.advance(fixed_now()).unwrap();
        controller.toggle_option(ItemId::new(2), 0).unwrap();
        controller.toggle_option(ItemId::new(2), 1).unwrap();

        let Advance::Finished(record) = controller.advance(fixed_now()).unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(record.score, 100);
        assert_eq!(record.passed, Some(true));
        assert_eq!(record.time_spent_seconds, 7);

        // terminal: nothing else is legal
        assert!(controller.advance(fixed_now()).is_err());
        assert!(controller.abandon().is_err());
        assert!(controller.current_item().is_none());
    }

    #[test]
    fn pause_freezes_elapsed_time() {
        let mut controller = started(quiz());
        controller.tick(5).unwrap();
        controller.pause().unwrap();
        controller.tick(5).unwrap();
        assert_eq!(controller.progress().elapsed_secs, 5);
        controller.resume().unwrap();
        controller.tick(5).unwrap();
        assert_eq!(controller.progress().elapsed_secs, 10);
    }

    #[test]
    fn progress_reflects_traversal() {
        let mut controller = started(quiz());
        let p = controller.progress();
        assert_eq!((p.current, p.total), (0, 2));
        assert_eq!(p.status, RunStatus::InProgress);

        controller
            .submit(ItemId::new(1), Response::Choice(2))
            .unwrap();
        controller.advance(fixed_now()).unwrap();
        assert_eq!(controller.progress().current, 1);
    }

    #[test]
    fn abandon_discards_the_run() {
        let mut controller = started(quiz());
        controller
            .submit(ItemId::new(1), Response::Choice(2))
            .unwrap();
        controller.abandon().unwrap();
        assert_eq!(controller.status(), RunStatus::Abandoned);
        assert!(controller.run().responses().is_empty());
    }
}
