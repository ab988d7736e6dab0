//! Shared error types for the services crate.

use thiserror::Error;

use coach_core::model::{ItemId, QuestionKind, RunError, RunStatus};
use storage::repository::StorageError;

/// Errors emitted by the session engine.
///
/// All of these are synchronous contract errors surfaced to the caller;
/// none are retried internally and none abort the host process. The UI
/// is expected to prevent illegal calls (for example by disabling "Next"
/// until a response exists) rather than relying on engine recovery.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session has no items")]
    EmptySession,

    #[error("operation not allowed while session is {status}")]
    InvalidTransition { status: RunStatus },

    #[error("item {0} is not part of the active session")]
    UnknownItem(ItemId),

    #[error("item {0} is not the item currently presented")]
    NotCurrentItem(ItemId),

    #[error("item {0} is an exercise and takes no response")]
    NotAQuestion(ItemId),

    #[error("option index {index} is outside the {options} available options")]
    OutOfRangeResponse { index: usize, options: usize },

    #[error("response shape does not fit a {kind} question")]
    ResponseKindMismatch { kind: QuestionKind },

    #[error("the current question has no submitted response")]
    ResponseRequired(ItemId),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<RunError> for SessionError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Empty => SessionError::EmptySession,
            RunError::InvalidTransition { status } => SessionError::InvalidTransition { status },
        }
    }
}
