use chrono::Duration;
use thiserror::Error;

/// Default delay before a correct answer rolls over to the next turn.
pub const DEFAULT_ADVANCE_DELAY_MS: u32 = 750;
/// Default lifetime of a transient hint or prompt message.
pub const DEFAULT_MESSAGE_DURATION_MS: u32 = 2_000;

/// What to do once every catalog item is mastered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExhaustionPolicy {
    /// Surface `AllMastered` and stop starting turns.
    #[default]
    Surface,
    /// Keep quizzing, sampling by capped weight as if nothing were mastered.
    CycleByWeight,
}

impl ExhaustionPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExhaustionPolicy::Surface => "surface",
            ExhaustionPolicy::CycleByWeight => "cycle_by_weight",
        }
    }

    /// # Errors
    ///
    /// Returns `QuizSettingsError::UnknownExhaustionPolicy` for unrecognized names.
    pub fn parse(value: &str) -> Result<Self, QuizSettingsError> {
        match value {
            "surface" => Ok(Self::Surface),
            "cycle_by_weight" => Ok(Self::CycleByWeight),
            other => Err(QuizSettingsError::UnknownExhaustionPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("weight cap must be finite and > 0, got {0}")]
    InvalidWeightCap(f64),

    #[error("advance delay must be between 1 and 60000 ms")]
    InvalidAdvanceDelay,

    #[error("message duration must be between 1 and 60000 ms")]
    InvalidMessageDuration,

    #[error("unknown exhaustion policy `{0}`")]
    UnknownExhaustionPolicy(String),
}

/// Tunable quiz behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSettings {
    weight_cap: Option<f64>,
    advance_delay_ms: u32,
    message_duration_ms: u32,
    exhaustion: ExhaustionPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct QuizSettingsDraft {
    pub weight_cap: Option<f64>,
    pub advance_delay_ms: Option<u32>,
    pub message_duration_ms: Option<u32>,
    pub exhaustion: Option<ExhaustionPolicy>,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError` if the cap or a duration is out of range.
    pub fn validate(self) -> Result<QuizSettings, QuizSettingsError> {
        if let Some(cap) = self.weight_cap {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(QuizSettingsError::InvalidWeightCap(cap));
            }
        }

        let advance_delay_ms = self.advance_delay_ms.unwrap_or(DEFAULT_ADVANCE_DELAY_MS);
        if !(1..=60_000).contains(&advance_delay_ms) {
            return Err(QuizSettingsError::InvalidAdvanceDelay);
        }

        let message_duration_ms = self
            .message_duration_ms
            .unwrap_or(DEFAULT_MESSAGE_DURATION_MS);
        if !(1..=60_000).contains(&message_duration_ms) {
            return Err(QuizSettingsError::InvalidMessageDuration);
        }

        Ok(QuizSettings {
            weight_cap: self.weight_cap,
            advance_delay_ms,
            message_duration_ms,
            exhaustion: self.exhaustion.unwrap_or_default(),
        })
    }
}

impl QuizSettings {
    /// # Errors
    ///
    /// Returns `QuizSettingsError` if persisted values no longer validate.
    pub fn from_persisted(draft: QuizSettingsDraft) -> Result<Self, QuizSettingsError> {
        draft.validate()
    }

    /// Ceiling applied to item weights before sampling; `None` is unbounded.
    #[must_use]
    pub fn weight_cap(&self) -> Option<f64> {
        self.weight_cap
    }

    #[must_use]
    pub fn advance_delay_ms(&self) -> u32 {
        self.advance_delay_ms
    }

    #[must_use]
    pub fn advance_delay(&self) -> Duration {
        Duration::milliseconds(i64::from(self.advance_delay_ms))
    }

    #[must_use]
    pub fn message_duration_ms(&self) -> u32 {
        self.message_duration_ms
    }

    #[must_use]
    pub fn message_duration(&self) -> Duration {
        Duration::milliseconds(i64::from(self.message_duration_ms))
    }

    #[must_use]
    pub fn exhaustion(&self) -> ExhaustionPolicy {
        self.exhaustion
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            weight_cap: None,
            advance_delay_ms: DEFAULT_ADVANCE_DELAY_MS,
            message_duration_ms: DEFAULT_MESSAGE_DURATION_MS,
            exhaustion: ExhaustionPolicy::Surface,
        }
    }
}
