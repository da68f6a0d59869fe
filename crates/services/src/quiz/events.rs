use flagquiz_core::model::{Coordinates, ItemId, QuizItem};

/// Request to center the visualization on an item.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusEvent {
    pub id: ItemId,
    pub coordinates: Coordinates,
}

impl FocusEvent {
    #[must_use]
    pub fn for_item(item: &QuizItem) -> Self {
        Self {
            id: item.id().clone(),
            coordinates: item.coordinates(),
        }
    }
}

/// Result of evaluating a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Correct on a clean turn; the item is now mastered.
    Memorized,
    /// Correct, but a hint, lookup, or earlier miss forfeited credit.
    Correct,
    Incorrect,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_correct(self) -> bool {
        !matches!(self, AnswerOutcome::Incorrect)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AnswerOutcome::Memorized => "Memorized!",
            AnswerOutcome::Correct => "Correct",
            AnswerOutcome::Incorrect => "Incorrect",
        }
    }
}

/// Everything the session tells the notification layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Outcome(AnswerOutcome),
    /// Transient text, e.g. a hint reveal or "select first" prompt.
    Message(String),
    /// The transient message timed out and should be hidden.
    MessageExpired,
    AllMastered,
    /// Progress could not be saved; play continues from memory.
    PersistenceFailed,
}

/// Visualization collaborator.
pub trait FocusSink: Send + Sync {
    fn focus(&self, event: &FocusEvent);
}

/// Toast/notification collaborator.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Sink that drops everything; used when no collaborator is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl FocusSink for Discard {
    fn focus(&self, _event: &FocusEvent) {}
}

impl NotificationSink for Discard {
    fn notify(&self, _notification: &Notification) {}
}
