use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use flagquiz_core::model::{
    Catalog, ExhaustionPolicy, HintUse, ItemId, MasterySet, Phase, QuizItem, QuizSettings,
    SessionTurn,
};
use flagquiz_core::{Clock, Deadline};

use super::events::{AnswerOutcome, Discard, FocusEvent, FocusSink, Notification, NotificationSink};
use super::mastery_store::MasteryStore;
use super::progress::{AnswerChoice, MasteryProgress, answer_choices};
use super::selection::{Selection, SelectionPolicy, pick_any, pick_next};
use crate::error::{PersistenceFailure, QuizError};

/// Prompt shown when the user submits or peeks without choosing an item.
pub const SELECT_FIRST_PROMPT: &str = "Select a country first";

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Outcome of trying to start a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnStart {
    Started(ItemId),
    /// Nothing left to draw; no turn is active.
    AllMastered,
}

/// What a hint request revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintReveal {
    pub id: ItemId,
    /// False when a hint was already taken this turn.
    pub first: bool,
    /// False when another transient message was still showing.
    pub message_shown: bool,
}

/// A timer that fired during `poll_timers_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    MessageExpired,
    Advanced(TurnStart),
}

#[derive(Debug, Clone)]
struct ActiveMessage {
    text: String,
    expires: Deadline,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Drives the quiz one turn at a time.
///
/// Every mutation happens inside a `&mut self` call, so there is a single
/// writer. Timers are deadlines checked by `poll_timers_at`; starting a turn
/// cancels both of them.
pub struct QuizSession {
    clock: Clock,
    catalog: Arc<Catalog>,
    store: MasteryStore,
    mastered: MasterySet,
    settings: QuizSettings,
    policy: SelectionPolicy,
    rng: StdRng,
    turn: Option<SessionTurn>,
    advance_at: Option<Deadline>,
    message: Option<ActiveMessage>,
    focus: Arc<dyn FocusSink>,
    notifications: Arc<dyn NotificationSink>,
    persistence_degraded: bool,
}

impl QuizSession {
    /// Load persisted mastery and build a session. No turn is started yet.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the mastery record cannot be read.
    pub async fn open(
        catalog: Arc<Catalog>,
        store: MasteryStore,
        settings: QuizSettings,
    ) -> Result<Self, QuizError> {
        let mastered = store.load().await?;
        tracing::debug!(
            mastered = mastered.len(),
            items = catalog.len(),
            "quiz session opened"
        );

        Ok(Self {
            clock: Clock::default_clock(),
            catalog,
            store,
            mastered,
            policy: SelectionPolicy {
                capacity: settings.weight_cap(),
            },
            settings,
            rng: StdRng::from_os_rng(),
            turn: None,
            advance_at: None,
            message: None,
            focus: Arc::new(Discard),
            notifications: Arc::new(Discard),
            persistence_degraded: false,
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn with_focus_sink(mut self, sink: Arc<dyn FocusSink>) -> Self {
        self.focus = sink;
        self
    }

    #[must_use]
    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notifications = sink;
        self
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn mastered(&self) -> &MasterySet {
        &self.mastered
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&QuizItem> {
        self.turn.as_ref().map(SessionTurn::current)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ItemId> {
        self.turn.as_ref().and_then(SessionTurn::selected)
    }

    /// Phase of the active turn, or `None` when no turn is running.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        self.turn.as_ref().map(SessionTurn::phase)
    }

    #[must_use]
    pub fn hint_used(&self) -> bool {
        self.turn
            .as_ref()
            .is_some_and(|turn| turn.credit().hint_used())
    }

    /// Text of the transient message currently on screen.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }

    #[must_use]
    pub fn pending_advance(&self) -> Option<Deadline> {
        self.advance_at
    }

    /// Earliest pending timer, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Deadline> {
        let message = self.message.as_ref().map(|m| m.expires);
        match (self.advance_at, message) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// True once any save failed during this session.
    #[must_use]
    pub fn persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    #[must_use]
    pub fn progress(&self) -> MasteryProgress {
        MasteryProgress::compute(&self.catalog, &self.mastered)
    }

    /// Every catalog item with its mastered marker, for an answer picker.
    #[must_use]
    pub fn answer_choices(&self) -> Vec<AnswerChoice> {
        answer_choices(&self.catalog, &self.mastered)
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Draw the next item and begin a fresh turn.
    ///
    /// Cancels any pending auto-advance and transient message.
    pub fn start_turn(&mut self) -> TurnStart {
        self.advance_at = None;
        self.dismiss_message();

        let picked = match pick_next(&self.catalog, &self.mastered, &self.policy, &mut self.rng) {
            Selection::Item(item) => Some(item),
            Selection::Exhausted => match self.settings.exhaustion() {
                ExhaustionPolicy::Surface => None,
                ExhaustionPolicy::CycleByWeight => {
                    pick_any(&self.catalog, &self.policy, &mut self.rng).item()
                }
            },
        }
        .cloned();

        let Some(item) = picked else {
            self.turn = None;
            tracing::info!(mastered = self.mastered.len(), "all items mastered");
            self.notifications.notify(&Notification::AllMastered);
            return TurnStart::AllMastered;
        };

        let id = item.id().clone();
        tracing::debug!(item = %id, "turn started");
        self.focus.focus(&FocusEvent::for_item(&item));
        self.turn = Some(SessionTurn::new(item));
        TurnStart::Started(id)
    }

    /// Record the user's current choice.
    ///
    /// If the confirm key was armed, the choice is submitted right away and
    /// its outcome returned.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownItem`, `QuizError::NoActiveTurn`, or any
    /// error from `submit_answer` when auto-submitting.
    pub async fn select_candidate(
        &mut self,
        id: &ItemId,
    ) -> Result<Option<AnswerOutcome>, QuizError> {
        // Any selection attempt consumes the armed key, even a rejected one.
        let by_key = self.active_turn_mut()?.take_key_submit();
        let id = self.resolve(id)?.id().clone();
        self.active_turn_mut()?.select(id.clone());
        if by_key {
            return self.submit_answer(Some(&id)).await.map(Some);
        }
        Ok(None)
    }

    /// Arm the confirm key so the next `select_candidate` submits.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveTurn` if no turn is running.
    pub fn arm_key_submit(&mut self) -> Result<(), QuizError> {
        self.active_turn_mut()?.arm_key_submit();
        Ok(())
    }

    /// Submit whatever is currently selected.
    ///
    /// # Errors
    ///
    /// See `submit_answer`.
    pub async fn submit_selected(&mut self) -> Result<AnswerOutcome, QuizError> {
        let selected = self.active_turn_mut()?.selected().cloned();
        self.submit_answer(selected.as_ref()).await
    }

    /// Evaluate an answer against the current item.
    ///
    /// A correct answer on a clean turn is committed to the mastery store.
    /// Save failures are logged and notified, never returned.
    ///
    /// # Errors
    ///
    /// - `QuizError::NoActiveTurn` if no turn is running.
    /// - `QuizError::AlreadyAnswered` while waiting to auto-advance.
    /// - `QuizError::NoSelection` if `candidate` is `None`.
    /// - `QuizError::UnknownItem` if `candidate` is not in the catalog.
    pub async fn submit_answer(
        &mut self,
        candidate: Option<&ItemId>,
    ) -> Result<AnswerOutcome, QuizError> {
        if self.active_turn_mut()?.phase() == Phase::FeedbackCorrect {
            return Err(QuizError::AlreadyAnswered);
        }
        let Some(candidate) = candidate else {
            self.show_message(SELECT_FIRST_PROMPT.to_string());
            return Err(QuizError::NoSelection);
        };
        let candidate = self.resolve(candidate)?.id().clone();

        let turn = self.active_turn_mut()?;
        if !turn.is_correct(&candidate) {
            turn.set_phase(Phase::FeedbackIncorrect);
            turn.credit_mut().record_miss();
            tracing::debug!(answer = %candidate, "incorrect answer");
            self.notifications
                .notify(&Notification::Outcome(AnswerOutcome::Incorrect));
            return Ok(AnswerOutcome::Incorrect);
        }

        turn.set_phase(Phase::FeedbackCorrect);
        let credited = turn.credit().credits_mastery();
        self.advance_at = Some(self.clock.deadline_after(self.settings.advance_delay()));

        let outcome = if credited {
            let saved = self.commit_mastery(candidate).await;
            self.notifications
                .notify(&Notification::Outcome(AnswerOutcome::Memorized));
            if let Err(failure) = saved {
                self.record_persistence_failure(&failure);
            }
            AnswerOutcome::Memorized
        } else {
            self.notifications
                .notify(&Notification::Outcome(AnswerOutcome::Correct));
            AnswerOutcome::Correct
        };
        Ok(outcome)
    }

    /// Reveal the current item. Forfeits mastery credit for this turn.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveTurn` if no turn is running.
    pub fn request_hint(&mut self) -> Result<HintReveal, QuizError> {
        let now = self.clock.now();
        let turn = self.active_turn_mut()?;
        let first = turn.credit_mut().use_hint() == HintUse::First;
        let item = turn.current().clone();

        let message_shown = if self.message_active(now) {
            false
        } else {
            self.show_message(item.id().to_string());
            true
        };
        self.focus.focus(&FocusEvent::for_item(&item));

        Ok(HintReveal {
            id: item.id().clone(),
            first,
            message_shown,
        })
    }

    /// Show any catalog item without evaluating it.
    ///
    /// Looking something up counts against mastery credit for the active turn.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownItem` if `id` is not in the catalog.
    pub fn peek(&mut self, id: &ItemId) -> Result<(), QuizError> {
        let event = FocusEvent::for_item(self.resolve(id)?);
        if let Some(turn) = self.turn.as_mut() {
            turn.credit_mut().record_lookup();
        }
        self.focus.focus(&event);
        Ok(())
    }

    /// Peek at the current selection.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSelection` if nothing is selected.
    pub fn peek_selected(&mut self) -> Result<(), QuizError> {
        let Some(selected) = self.selected().cloned() else {
            self.show_message(SELECT_FIRST_PROMPT.to_string());
            return Err(QuizError::NoSelection);
        };
        self.peek(&selected)
    }

    /// Forget all progress and start over with a new turn.
    pub async fn reset(&mut self) -> TurnStart {
        let (cleared, saved) = self.store.reset().await;
        self.mastered = cleared;
        if let Err(failure) = saved {
            self.record_persistence_failure(&failure);
        }
        tracing::info!("mastery progress reset");
        self.start_turn()
    }

    /// Fire timers that are due at the clock's current time.
    pub fn poll_timers(&mut self) -> Vec<TimerEvent> {
        let now = self.clock.now();
        self.poll_timers_at(now)
    }

    /// Fire timers that are due at `now`: message expiry first, then auto-advance.
    pub fn poll_timers_at(&mut self, now: DateTime<Utc>) -> Vec<TimerEvent> {
        let mut fired = Vec::new();

        if self
            .message
            .as_ref()
            .is_some_and(|m| m.expires.is_due(now))
        {
            self.dismiss_message();
            fired.push(TimerEvent::MessageExpired);
        }

        if self.advance_at.is_some_and(|deadline| deadline.is_due(now)) {
            fired.push(TimerEvent::Advanced(self.start_turn()));
        }

        fired
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────────
    //

    fn active_turn_mut(&mut self) -> Result<&mut SessionTurn, QuizError> {
        self.turn.as_mut().ok_or(QuizError::NoActiveTurn)
    }

    fn resolve(&self, id: &ItemId) -> Result<&QuizItem, QuizError> {
        self.catalog
            .get(id.as_str())
            .ok_or_else(|| QuizError::UnknownItem(id.to_string()))
    }

    async fn commit_mastery(&mut self, id: ItemId) -> Result<(), PersistenceFailure> {
        tracing::info!(item = %id, "item memorized");
        self.mastered.insert(id);
        self.store.save(&self.mastered).await
    }

    fn record_persistence_failure(&mut self, failure: &PersistenceFailure) {
        tracing::warn!(error = %failure, "continuing with in-memory mastery");
        self.persistence_degraded = true;
        self.notifications.notify(&Notification::PersistenceFailed);
    }

    fn message_active(&self, now: DateTime<Utc>) -> bool {
        self.message
            .as_ref()
            .is_some_and(|m| !m.expires.is_due(now))
    }

    fn show_message(&mut self, text: String) {
        let expires = self.clock.deadline_after(self.settings.message_duration());
        self.notifications
            .notify(&Notification::Message(text.clone()));
        self.message = Some(ActiveMessage { text, expires });
    }

    fn dismiss_message(&mut self) {
        if self.message.take().is_some() {
            self.notifications.notify(&Notification::MessageExpired);
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("catalog_len", &self.catalog.len())
            .field("mastered_len", &self.mastered.len())
            .field("turn", &self.turn)
            .field("advance_at", &self.advance_at)
            .field("message", &self.message)
            .field("persistence_degraded", &self.persistence_degraded)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use flagquiz_core::model::{CatalogDraft, QuizItemDraft, QuizSettingsDraft};
    use flagquiz_core::time::{fixed_clock, fixed_now};
    use std::sync::Mutex;
    use storage::repository::{InMemoryRepository, MasteryRecordRepository};

    #[derive(Default)]
    struct Recorder {
        focused: Mutex<Vec<ItemId>>,
        notified: Mutex<Vec<Notification>>,
    }

    impl Recorder {
        fn focused(&self) -> Vec<ItemId> {
            self.focused.lock().unwrap().clone()
        }

        fn notified(&self) -> Vec<Notification> {
            self.notified.lock().unwrap().clone()
        }
    }

    impl FocusSink for Recorder {
        fn focus(&self, event: &FocusEvent) {
            self.focused.lock().unwrap().push(event.id.clone());
        }
    }

    impl NotificationSink for Recorder {
        fn notify(&self, notification: &Notification) {
            self.notified.lock().unwrap().push(notification.clone());
        }
    }

    fn id(value: &str) -> ItemId {
        ItemId::new(value).unwrap()
    }

    fn catalog(items: &[(&str, f64)]) -> Arc<Catalog> {
        Arc::new(
            CatalogDraft {
                reference_total: None,
                items: items
                    .iter()
                    .map(|(id, weight)| QuizItemDraft {
                        id: (*id).to_string(),
                        weight: *weight,
                        coordinates: [10.0, 20.0],
                    })
                    .collect(),
            }
            .validate()
            .unwrap(),
        )
    }

    async fn session_with(
        items: &[(&str, f64)],
        repo: &InMemoryRepository,
        settings: QuizSettings,
    ) -> (QuizSession, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let session = QuizSession::open(
            catalog(items),
            MasteryStore::new(Arc::new(repo.clone())),
            settings,
        )
        .await
        .unwrap()
        .with_clock(fixed_clock())
        .with_rng(StdRng::seed_from_u64(42))
        .with_focus_sink(recorder.clone())
        .with_notification_sink(recorder.clone());
        (session, recorder)
    }

    async fn single_item_session(repo: &InMemoryRepository) -> (QuizSession, Arc<Recorder>) {
        session_with(&[("A", 10.0)], repo, QuizSettings::default()).await
    }

    #[tokio::test]
    async fn start_turn_focuses_current_item() {
        let repo = InMemoryRepository::new();
        let (mut session, recorder) = single_item_session(&repo).await;

        assert_eq!(session.start_turn(), TurnStart::Started(id("A")));
        assert_eq!(session.phase(), Some(Phase::AwaitingAnswer));
        assert_eq!(recorder.focused(), vec![id("A")]);
        assert!(!session.hint_used());
    }

    #[tokio::test]
    async fn clean_correct_answer_memorizes() {
        let repo = InMemoryRepository::new();
        let (mut session, recorder) = single_item_session(&repo).await;
        session.start_turn();

        let outcome = session.submit_answer(Some(&id("A"))).await.unwrap();

        assert_eq!(outcome, AnswerOutcome::Memorized);
        assert_eq!(session.phase(), Some(Phase::FeedbackCorrect));
        assert!(session.mastered().contains("A"));
        assert_eq!(repo.read_record().await.unwrap().as_deref(), Some("A"));
        assert!(recorder
            .notified()
            .contains(&Notification::Outcome(AnswerOutcome::Memorized)));
    }

    #[tokio::test]
    async fn hinted_correct_answer_is_not_credited() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) = single_item_session(&repo).await;
        session.start_turn();

        let reveal = session.request_hint().unwrap();
        assert!(reveal.first);
        assert!(session.hint_used());

        let outcome = session.submit_answer(Some(&id("A"))).await.unwrap();
        assert_eq!(outcome, AnswerOutcome::Correct);
        assert!(session.mastered().is_empty());
        assert_eq!(repo.read_record().await.unwrap(), None);
    }

    #[tokio::test]
    async fn wrong_then_right_is_not_credited() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) =
            session_with(&[("A", 10.0), ("B", 0.0)], &repo, QuizSettings::default()).await;
        session.start_turn();

        let outcome = session.submit_answer(Some(&id("B"))).await.unwrap();
        assert_eq!(outcome, AnswerOutcome::Incorrect);
        assert_eq!(session.phase(), Some(Phase::FeedbackIncorrect));
        assert!(session.pending_advance().is_none());

        let retry = session.submit_answer(Some(&id("A"))).await.unwrap();
        assert_eq!(retry, AnswerOutcome::Correct);
        assert!(session.mastered().is_empty());
        assert_eq!(repo.read_record().await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_selection_is_recoverable() {
        let repo = InMemoryRepository::new();
        let (mut session, recorder) = single_item_session(&repo).await;
        session.start_turn();

        let err = session.submit_selected().await.unwrap_err();
        assert!(matches!(err, QuizError::NoSelection));
        assert_eq!(session.phase(), Some(Phase::AwaitingAnswer));
        assert_eq!(session.message(), Some(SELECT_FIRST_PROMPT));
        assert!(recorder
            .notified()
            .contains(&Notification::Message(SELECT_FIRST_PROMPT.to_string())));
    }

    #[tokio::test]
    async fn unknown_candidate_is_rejected() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) = single_item_session(&repo).await;
        session.start_turn();

        let err = session.submit_answer(Some(&id("Atlantis"))).await.unwrap_err();
        assert!(matches!(err, QuizError::UnknownItem(name) if name == "Atlantis"));
        assert_eq!(session.phase(), Some(Phase::AwaitingAnswer));
    }

    #[tokio::test]
    async fn submitting_before_a_turn_fails() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) = single_item_session(&repo).await;

        let err = session.submit_answer(Some(&id("A"))).await.unwrap_err();
        assert!(matches!(err, QuizError::NoActiveTurn));
    }

    #[tokio::test]
    async fn second_submit_after_correct_is_rejected() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) = single_item_session(&repo).await;
        session.start_turn();
        session.submit_answer(Some(&id("A"))).await.unwrap();

        let err = session.submit_answer(Some(&id("A"))).await.unwrap_err();
        assert!(matches!(err, QuizError::AlreadyAnswered));
    }

    #[tokio::test]
    async fn key_armed_selection_submits() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) = single_item_session(&repo).await;
        session.start_turn();

        assert_eq!(session.select_candidate(&id("A")).await.unwrap(), None);
        assert_eq!(session.selected(), Some(&id("A")));
        assert_eq!(session.phase(), Some(Phase::AwaitingAnswer));

        session.arm_key_submit().unwrap();
        let outcome = session.select_candidate(&id("A")).await.unwrap();
        assert_eq!(outcome, Some(AnswerOutcome::Memorized));
    }

    #[tokio::test]
    async fn rejected_key_selection_disarms_the_key() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) =
            session_with(&[("A", 10.0), ("B", 0.0)], &repo, QuizSettings::default()).await;
        session.start_turn();

        session.arm_key_submit().unwrap();
        let err = session.select_candidate(&id("Atlantis")).await.unwrap_err();
        assert!(matches!(err, QuizError::UnknownItem(name) if name == "Atlantis"));

        assert_eq!(session.select_candidate(&id("B")).await.unwrap(), None);
        assert_eq!(session.selected(), Some(&id("B")));
        assert_eq!(session.phase(), Some(Phase::AwaitingAnswer));

        let outcome = session.submit_answer(Some(&id("A"))).await.unwrap();
        assert_eq!(outcome, AnswerOutcome::Memorized);
    }

    #[tokio::test]
    async fn peek_forfeits_credit_but_is_not_a_hint() {
        let repo = InMemoryRepository::new();
        let (mut session, recorder) =
            session_with(&[("A", 10.0), ("B", 0.0)], &repo, QuizSettings::default()).await;
        session.start_turn();

        session.peek(&id("B")).unwrap();
        assert!(!session.hint_used());
        assert_eq!(session.phase(), Some(Phase::AwaitingAnswer));
        assert_eq!(recorder.focused(), vec![id("A"), id("B")]);

        let outcome = session.submit_answer(Some(&id("A"))).await.unwrap();
        assert_eq!(outcome, AnswerOutcome::Correct);
    }

    #[tokio::test]
    async fn peek_selected_requires_selection() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) = single_item_session(&repo).await;
        session.start_turn();

        assert!(matches!(
            session.peek_selected().unwrap_err(),
            QuizError::NoSelection
        ));
    }

    #[tokio::test]
    async fn auto_advance_fires_after_delay() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) =
            session_with(&[("A", 10.0), ("B", 10.0)], &repo, QuizSettings::default()).await;
        session.start_turn();
        let current = session.current_item().unwrap().id().clone();
        session.submit_answer(Some(&current)).await.unwrap();

        let deadline = session.pending_advance().unwrap();
        assert_eq!(deadline.fires_at(), fixed_now() + Duration::milliseconds(750));

        assert!(session
            .poll_timers_at(fixed_now() + Duration::milliseconds(749))
            .is_empty());

        let fired = session.poll_timers_at(fixed_now() + Duration::milliseconds(750));
        assert_eq!(fired.len(), 1);
        let TimerEvent::Advanced(TurnStart::Started(next)) = &fired[0] else {
            panic!("expected a new turn, got {fired:?}");
        };
        assert_ne!(next, &current);
        assert_eq!(session.phase(), Some(Phase::AwaitingAnswer));
        assert!(session.pending_advance().is_none());
    }

    #[tokio::test]
    async fn manual_start_cancels_pending_advance() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) =
            session_with(&[("A", 10.0), ("B", 10.0)], &repo, QuizSettings::default()).await;
        session.start_turn();
        let current = session.current_item().unwrap().id().clone();
        session.submit_answer(Some(&current)).await.unwrap();

        session.start_turn();
        assert!(session.pending_advance().is_none());
        assert!(session
            .poll_timers_at(fixed_now() + Duration::seconds(10))
            .is_empty());
    }

    #[tokio::test]
    async fn hint_message_expires_independently_of_phase() {
        let repo = InMemoryRepository::new();
        let (mut session, recorder) = single_item_session(&repo).await;
        session.start_turn();

        let reveal = session.request_hint().unwrap();
        assert!(reveal.message_shown);
        assert_eq!(session.message(), Some("A"));

        let again = session.request_hint().unwrap();
        assert!(!again.first);
        assert!(!again.message_shown);

        let fired = session.poll_timers_at(fixed_now() + Duration::seconds(2));
        assert_eq!(fired, vec![TimerEvent::MessageExpired]);
        assert_eq!(session.message(), None);
        assert_eq!(session.phase(), Some(Phase::AwaitingAnswer));
        assert!(recorder.notified().contains(&Notification::MessageExpired));
        assert_eq!(recorder.focused(), vec![id("A"), id("A"), id("A")]);
    }

    #[tokio::test]
    async fn new_turn_resets_hint_state() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) =
            session_with(&[("A", 10.0), ("B", 10.0)], &repo, QuizSettings::default()).await;
        session.start_turn();
        session.request_hint().unwrap();

        session.start_turn();
        assert!(!session.hint_used());
        assert_eq!(session.message(), None);
    }

    #[tokio::test]
    async fn all_mastered_is_surfaced() {
        let repo = InMemoryRepository::with_record("A");
        let (mut session, recorder) = single_item_session(&repo).await;

        assert_eq!(session.start_turn(), TurnStart::AllMastered);
        assert!(session.current_item().is_none());
        assert!(recorder.notified().contains(&Notification::AllMastered));
        assert!(session.progress().is_complete());
    }

    #[tokio::test]
    async fn cycle_policy_keeps_quizzing_after_completion() {
        let repo = InMemoryRepository::with_record("A");
        let settings = QuizSettingsDraft {
            exhaustion: Some(ExhaustionPolicy::CycleByWeight),
            ..QuizSettingsDraft::default()
        }
        .validate()
        .unwrap();
        let (mut session, _recorder) = session_with(&[("A", 10.0)], &repo, settings).await;

        assert_eq!(session.start_turn(), TurnStart::Started(id("A")));
    }

    #[tokio::test]
    async fn answer_choices_follow_memorized_items() {
        let repo = InMemoryRepository::new();
        let (mut session, _recorder) = single_item_session(&repo).await;
        session.start_turn();
        assert!(!session.answer_choices()[0].mastered);

        session.submit_answer(Some(&id("A"))).await.unwrap();
        assert!(session.answer_choices()[0].mastered);
    }

    #[tokio::test]
    async fn reset_clears_store_and_starts_turn() {
        let repo = InMemoryRepository::with_record("A");
        let (mut session, _recorder) = single_item_session(&repo).await;
        assert_eq!(session.start_turn(), TurnStart::AllMastered);

        assert_eq!(session.reset().await, TurnStart::Started(id("A")));
        assert!(session.mastered().is_empty());
        assert_eq!(repo.read_record().await.unwrap().as_deref(), Some(""));
    }
}
