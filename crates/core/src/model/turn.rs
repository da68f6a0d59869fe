use crate::model::ids::ItemId;
use crate::model::item::QuizItem;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a turn is in its answer/feedback cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingAnswer,
    /// Answered correctly; the next turn starts after the auto-advance delay.
    FeedbackCorrect,
    /// Answered wrong; stays until the user acts again.
    FeedbackIncorrect,
}

//
// ─── TURN CREDIT (HINT CONTROLLER) ─────────────────────────────────────────────
//

/// Whether the first hint of the turn was just taken or one was already used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintUse {
    First,
    Repeat,
}

/// Per-turn bookkeeping that decides whether a correct answer earns mastery.
///
/// A turn credits mastery only if the answer is correct, no hint was used,
/// no wrong attempt was made, and no item was looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnCredit {
    hint_used: bool,
    knows_without_hint: bool,
}

impl Default for TurnCredit {
    fn default() -> Self {
        Self {
            hint_used: false,
            knows_without_hint: true,
        }
    }
}

impl TurnCredit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_hint(&mut self) -> HintUse {
        self.knows_without_hint = false;
        if self.hint_used {
            HintUse::Repeat
        } else {
            self.hint_used = true;
            HintUse::First
        }
    }

    /// A manual lookup counts like a hint for crediting, but is not a hint.
    pub fn record_lookup(&mut self) {
        self.knows_without_hint = false;
    }

    pub fn record_miss(&mut self) {
        self.knows_without_hint = false;
    }

    #[must_use]
    pub fn hint_used(&self) -> bool {
        self.hint_used
    }

    #[must_use]
    pub fn credits_mastery(&self) -> bool {
        self.knows_without_hint && !self.hint_used
    }
}

//
// ─── SESSION TURN ──────────────────────────────────────────────────────────────
//

/// Transient state of one selection-through-feedback cycle.
#[derive(Debug, Clone)]
pub struct SessionTurn {
    current: QuizItem,
    selected: Option<ItemId>,
    credit: TurnCredit,
    phase: Phase,
    submitted_by_key: bool,
}

impl SessionTurn {
    #[must_use]
    pub fn new(current: QuizItem) -> Self {
        Self {
            current,
            selected: None,
            credit: TurnCredit::new(),
            phase: Phase::AwaitingAnswer,
            submitted_by_key: false,
        }
    }

    #[must_use]
    pub fn current(&self) -> &QuizItem {
        &self.current
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ItemId> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, id: ItemId) {
        self.selected = Some(id);
    }

    #[must_use]
    pub fn credit(&self) -> &TurnCredit {
        &self.credit
    }

    pub fn credit_mut(&mut self) -> &mut TurnCredit {
        &mut self.credit
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    #[must_use]
    pub fn is_correct(&self, candidate: &ItemId) -> bool {
        self.current.id() == candidate
    }

    /// Marks that the next selection change came from the confirm key.
    pub fn arm_key_submit(&mut self) {
        self.submitted_by_key = true;
    }

    /// Returns whether the confirm key was armed, clearing the flag.
    pub fn take_key_submit(&mut self) -> bool {
        std::mem::take(&mut self.submitted_by_key)
    }
}
