mod ids;
mod item;
mod record;
mod response;
mod run;
mod session;

pub use ids::{ItemId, ParseIdError, SessionId};
pub use item::{AnswerKey, Exercise, Item, ItemError, Question, QuestionKind};
pub use record::{CompletionRecord, ItemOutcome};
pub use response::{Response, ResponseState};
pub use run::{RunError, RunStatus, SessionRun, StepOutcome};
pub use session::{SessionDefinition, SessionKind};
