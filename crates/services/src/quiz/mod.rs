mod events;
mod mastery_store;
mod progress;
mod selection;
mod session;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use events::{
    AnswerOutcome, Discard, FocusEvent, FocusSink, Notification, NotificationSink,
};
pub use mastery_store::MasteryStore;
pub use progress::{AnswerChoice, MasteryProgress, answer_choices};
pub use selection::{Selection, SelectionPolicy, pick_any, pick_next};
pub use session::{HintReveal, QuizSession, SELECT_FIRST_PROMPT, TimerEvent, TurnStart};
