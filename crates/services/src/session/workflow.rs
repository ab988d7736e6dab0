use serde::Serialize;
use std::sync::Arc;

use coach_core::Clock;
use coach_core::model::{CompletionRecord, ItemId, Response, SessionId};
use storage::repository::{ResultsRepository, SessionCatalog};

use super::controller::{Advance, SessionController};
use super::progress::SessionProgress;
use super::recorder::{Aggregates, CompletionRecorder};
use crate::error::SessionError;

/// Payload of the completion signal: the archived record plus the
/// freshly recomputed aggregates for the UI and persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionSignal {
    pub record: CompletionRecord,
    pub aggregates: Aggregates,
}

/// Receiver for the engine's outbound signals.
///
/// `progress` fires after every state-changing call; `completed` fires
/// once, at the Completed transition. Both run synchronously on the
/// caller's thread and must not block.
pub trait ProgressObserver: Send + Sync {
    fn progress(&self, _progress: &SessionProgress) {}
    fn completed(&self, _signal: &CompletionSignal) {}
}

/// No-op observer for callers that poll `SessionController::progress`.
pub struct NullObserver;

impl ProgressObserver for NullObserver {}

//
// ─── SESSION LOOP ──────────────────────────────────────────────────────────────
//

/// Orchestrates catalog-backed session starts, progress signaling and
/// completion recording around a `SessionController`.
#[derive(Clone)]
pub struct SessionLoop {
    clock: Clock,
    catalog: Arc<dyn SessionCatalog>,
    recorder: CompletionRecorder,
    observer: Arc<dyn ProgressObserver>,
}

impl SessionLoop {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<dyn SessionCatalog>,
        results: Arc<dyn ResultsRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            recorder: CompletionRecorder::new(results),
            observer: Arc::new(NullObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn emit(&self, session: &SessionController) {
        self.observer.progress(&session.progress());
    }

    /// Fetch the definition and start a controller for it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` for catalog failures and
    /// `SessionError::EmptySession` for a zero-item definition.
    pub fn start_session(&self, id: SessionId) -> Result<SessionController, SessionError> {
        let definition = self.catalog.definition(id)?;
        let mut session = SessionController::new(definition, self.clock.now());
        session.start()?;
        self.emit(&session);
        Ok(session)
    }

    /// Submit a response for the current item.
    ///
    /// # Errors
    ///
    /// Propagates the controller's validation errors.
    pub fn submit(
        &self,
        session: &mut SessionController,
        item_id: ItemId,
        response: Response,
    ) -> Result<(), SessionError> {
        session.submit(item_id, response)?;
        self.emit(session);
        Ok(())
    }

    /// Toggle an option of the current multi-select question.
    ///
    /// # Errors
    ///
    /// Propagates the controller's validation errors.
    pub fn toggle_option(
        &self,
        session: &mut SessionController,
        item_id: ItemId,
        index: usize,
    ) -> Result<(), SessionError> {
        session.toggle_option(item_id, index)?;
        self.emit(session);
        Ok(())
    }

    /// Advance past the current item; on the final advance the record is
    /// archived and the completion signal emitted.
    ///
    /// # Errors
    ///
    /// Propagates controller errors; storage failures while recording
    /// surface as `SessionError::Storage` and are not retried.
    pub fn advance(
        &self,
        session: &mut SessionController,
    ) -> Result<Option<CompletionSignal>, SessionError> {
        match session.advance(self.clock.now())? {
            Advance::Continued => {
                self.emit(session);
                Ok(None)
            }
            Advance::Finished(record) => {
                let aggregates = self.recorder.record(&record)?;
                let signal = CompletionSignal { record, aggregates };
                self.emit(session);
                self.observer.completed(&signal);
                Ok(Some(signal))
            }
        }
    }

    /// Pause the session; elapsed time freezes.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless InProgress.
    pub fn pause(&self, session: &mut SessionController) -> Result<(), SessionError> {
        session.pause()?;
        self.emit(session);
        Ok(())
    }

    /// Resume a paused session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless Paused.
    pub fn resume(&self, session: &mut SessionController) -> Result<(), SessionError> {
        session.resume()?;
        self.emit(session);
        Ok(())
    }

    /// Feed one delta from the periodic clock source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` after a terminal state.
    pub fn tick(&self, session: &mut SessionController, delta_secs: u32) -> Result<(), SessionError> {
        session.tick(delta_secs)?;
        self.emit(session);
        Ok(())
    }

    /// Abandon the session; no record is produced and the caller must
    /// stop its tick source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` once terminal.
    pub fn abandon(&self, session: &mut SessionController) -> Result<(), SessionError> {
        session.abandon()?;
        self.emit(session);
        Ok(())
    }
}
