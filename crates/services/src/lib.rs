#![forbid(unsafe_code)]

pub mod error;
pub mod session;

pub use coach_core::Clock;

pub use error::SessionError;
pub use session::{
    Advance, Aggregates, CompletionRecorder, CompletionSignal, HistoryListItem, HistoryService,
    NullObserver, ProgressObserver, SessionController, SessionLoop, SessionProgress,
};
