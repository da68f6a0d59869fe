#![forbid(unsafe_code)]

pub mod catalog_loader;
pub mod error;
pub mod quiz;
pub mod settings_service;

pub use flagquiz_core::Clock;

pub use catalog_loader::{load_catalog_file, parse_catalog};
pub use error::{CatalogLoadError, PersistenceFailure, QuizError, QuizSettingsServiceError};
pub use quiz::{
    AnswerChoice, AnswerOutcome, FocusEvent, FocusSink, HintReveal, MasteryProgress,
    MasteryStore, Notification, NotificationSink, QuizSession, Selection, SelectionPolicy,
    TimerEvent, TurnStart, answer_choices, pick_any, pick_next,
};
pub use settings_service::QuizSettingsService;
