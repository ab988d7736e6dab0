use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::{ItemId, SessionId};
use crate::model::response::{Response, ResponseState};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised by illegal run transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("operation not allowed while session is {status}")]
    InvalidTransition { status: RunStatus },

    #[error("session has no items")]
    Empty,
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle state of a session run.
///
/// Transitions are one-directional except InProgress ⇄ Paused:
/// NotStarted → InProgress ⇄ Paused → Completed, and any non-terminal
/// state → Abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    NotStarted,
    InProgress,
    Paused,
    Completed,
    Abandoned,
}

impl RunStatus {
    /// Completed and Abandoned admit no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Abandoned)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::NotStarted => "not started",
            RunStatus::InProgress => "in progress",
            RunStatus::Paused => "paused",
            RunStatus::Completed => "completed",
            RunStatus::Abandoned => "abandoned",
        };
        write!(f, "{name}")
    }
}

/// Result of advancing past the current item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved to the next item.
    Moved,
    /// The last item was passed; the run is now Completed.
    Finished,
}

//
// ─── RUN ───────────────────────────────────────────────────────────────────────
//

/// Live, mutable state of one traversal of a session.
///
/// A run is exclusively owned by the controller presenting it. It owns
/// the state-machine invariants: the current index stays inside the item
/// range, elapsed time only accumulates while InProgress, and no
/// transition leaves a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRun {
    session_id: SessionId,
    started_at: DateTime<Utc>,
    item_count: usize,
    current: usize,
    elapsed_secs: u32,
    status: RunStatus,
    responses: ResponseState,
}

impl SessionRun {
    #[must_use]
    pub fn new(session_id: SessionId, item_count: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            session_id,
            started_at,
            item_count,
            current: 0,
            elapsed_secs: 0,
            status: RunStatus::NotStarted,
            responses: ResponseState::new(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Index of the item currently presented.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Accumulated active seconds (frozen while Paused).
    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn responses(&self) -> &ResponseState {
        &self.responses
    }

    fn ensure(&self, expected: RunStatus) -> Result<(), RunError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(RunError::InvalidTransition {
                status: self.status,
            })
        }
    }

    /// NotStarted → InProgress, resetting index, elapsed time and responses.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Empty` for a zero-item session and
    /// `RunError::InvalidTransition` when the run has already started.
    pub fn begin(&mut self) -> Result<(), RunError> {
        self.ensure(RunStatus::NotStarted)?;
        if self.item_count == 0 {
            return Err(RunError::Empty);
        }
        self.current = 0;
        self.elapsed_secs = 0;
        self.responses.clear();
        self.status = RunStatus::InProgress;
        Ok(())
    }

    /// InProgress → Paused.
    ///
    /// # Errors
    ///
    /// Returns `RunError::InvalidTransition` unless the run is InProgress.
    pub fn pause(&mut self) -> Result<(), RunError> {
        self.ensure(RunStatus::InProgress)?;
        self.status = RunStatus::Paused;
        Ok(())
    }

    /// Paused → InProgress.
    ///
    /// # Errors
    ///
    /// Returns `RunError::InvalidTransition` unless the run is Paused.
    pub fn resume(&mut self) -> Result<(), RunError> {
        self.ensure(RunStatus::Paused)?;
        self.status = RunStatus::InProgress;
        Ok(())
    }

    /// Accumulate active time from the external periodic clock.
    ///
    /// While Paused this is a no-op, which is what freezes the elapsed
    /// accumulator; the tick source does not need to be stopped on pause.
    ///
    /// # Errors
    ///
    /// Returns `RunError::InvalidTransition` before start or after a
    /// terminal transition.
    pub fn tick(&mut self, delta_secs: u32) -> Result<(), RunError> {
        match self.status {
            RunStatus::InProgress => {
                self.elapsed_secs = self.elapsed_secs.saturating_add(delta_secs);
                Ok(())
            }
            RunStatus::Paused => Ok(()),
            _ => Err(RunError::InvalidTransition {
                status: self.status,
            }),
        }
    }

    /// Record a response for an item (last write wins).
    ///
    /// The controller is responsible for the current-item rule; the run
    /// only guards the status.
    ///
    /// # Errors
    ///
    /// Returns `RunError::InvalidTransition` unless the run is InProgress.
    pub fn record_response(&mut self, item_id: ItemId, response: Response) -> Result<(), RunError> {
        self.ensure(RunStatus::InProgress)?;
        self.responses.record(item_id, response);
        Ok(())
    }

    /// Step past the current item; passing the last item completes the run.
    ///
    /// # Errors
    ///
    /// Returns `RunError::InvalidTransition` unless the run is InProgress.
    pub fn advance(&mut self) -> Result<StepOutcome, RunError> {
        self.ensure(RunStatus::InProgress)?;
        if self.current + 1 >= self.item_count {
            self.status = RunStatus::Completed;
            Ok(StepOutcome::Finished)
        } else {
            self.current += 1;
            Ok(StepOutcome::Moved)
        }
    }

    /// Abandon the run, discarding in-flight progress.
    ///
    /// Legal from any non-terminal state; produces no completion record.
    ///
    /// # Errors
    ///
    /// Returns `RunError::InvalidTransition` once Completed or Abandoned.
    pub fn abandon(&mut self) -> Result<(), RunError> {
        if self.status.is_terminal() {
            return Err(RunError::InvalidTransition {
                status: self.status,
            });
        }
        self.responses.clear();
        self.status = RunStatus::Abandoned;
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
