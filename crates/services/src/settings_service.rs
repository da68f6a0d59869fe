use std::sync::Arc;

use flagquiz_core::model::{QuizSettings, QuizSettingsDraft};
use storage::repository::QuizSettingsRepository;

use crate::error::QuizSettingsServiceError;

#[derive(Clone)]
pub struct QuizSettingsService {
    repo: Arc<dyn QuizSettingsRepository>,
}

impl QuizSettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn QuizSettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<QuizSettings, QuizSettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsServiceError` if validation fails or persistence fails.
    pub async fn save(
        &self,
        draft: QuizSettingsDraft,
    ) -> Result<QuizSettings, QuizSettingsServiceError> {
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        Ok(settings)
    }
}
