mod capture;
mod controller;
mod progress;
mod recorder;
mod scoring;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{Advance, SessionController};
pub use progress::SessionProgress;
pub use recorder::{Aggregates, CompletionRecorder};
pub use view::{HistoryListItem, HistoryService};
pub use workflow::{CompletionSignal, NullObserver, ProgressObserver, SessionLoop};
