use async_trait::async_trait;
use sqlx::Row;

use crate::repository::{QuizSettingsRepository, StorageError};
use flagquiz_core::model::{ExhaustionPolicy, QuizSettings, QuizSettingsDraft};

use super::SqliteRepository;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn ms_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range")))
}

#[async_trait]
impl QuizSettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<QuizSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                weight_cap,
                advance_delay_ms,
                message_duration_ms,
                exhaustion
            FROM quiz_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let weight_cap: Option<f64> = row.try_get("weight_cap").map_err(ser)?;
        let advance_delay_ms: i64 = row.try_get("advance_delay_ms").map_err(ser)?;
        let message_duration_ms: i64 = row.try_get("message_duration_ms").map_err(ser)?;
        let exhaustion: String = row.try_get("exhaustion").map_err(ser)?;

        QuizSettings::from_persisted(QuizSettingsDraft {
            weight_cap,
            advance_delay_ms: Some(ms_from_i64("advance_delay_ms", advance_delay_ms)?),
            message_duration_ms: Some(ms_from_i64("message_duration_ms", message_duration_ms)?),
            exhaustion: Some(ExhaustionPolicy::parse(&exhaustion).map_err(ser)?),
        })
        .map(Some)
        .map_err(ser)
    }

    async fn save_settings(&self, settings: &QuizSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quiz_settings (
                id,
                weight_cap,
                advance_delay_ms,
                message_duration_ms,
                exhaustion
            )
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                weight_cap = excluded.weight_cap,
                advance_delay_ms = excluded.advance_delay_ms,
                message_duration_ms = excluded.message_duration_ms,
                exhaustion = excluded.exhaustion
            ",
        )
        .bind(1_i64)
        .bind(settings.weight_cap())
        .bind(i64::from(settings.advance_delay_ms()))
        .bind(i64::from(settings.message_duration_ms()))
        .bind(settings.exhaustion().as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
