mod catalog;
mod ids;
mod item;
mod mastery;
mod settings;
mod turn;

pub use catalog::{Catalog, CatalogDraft, CatalogError};
pub use ids::{ItemId, ItemIdError, RECORD_DELIMITER};
pub use item::{Coordinates, ItemError, QuizItem, QuizItemDraft};
pub use mastery::MasterySet;
pub use settings::{
    DEFAULT_ADVANCE_DELAY_MS, DEFAULT_MESSAGE_DURATION_MS, ExhaustionPolicy, QuizSettings,
    QuizSettingsDraft, QuizSettingsError,
};
pub use turn::{HintUse, Phase, SessionTurn, TurnCredit};
