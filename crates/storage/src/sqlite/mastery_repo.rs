use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{MasteryRecordRepository, StorageError};

use super::SqliteRepository;

#[async_trait]
impl MasteryRecordRepository for SqliteRepository {
    async fn read_record(&self) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT record FROM mastery_record WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        row.try_get::<String, _>("record")
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn write_record(&self, record: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO mastery_record (id, record, updated_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                record = excluded.record,
                updated_at = excluded.updated_at
            ",
        )
        .bind(record)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
