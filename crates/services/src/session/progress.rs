use serde::Serialize;

use coach_core::model::RunStatus;

/// Snapshot of traversal progress, suitable for a progress indicator.
///
/// Emitted after every state-changing engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    /// Index of the item currently presented.
    pub current: usize,
    /// Total items in the session.
    pub total: usize,
    /// Accumulated active seconds.
    pub elapsed_secs: u32,
    pub status: RunStatus,
}
