use std::sync::Arc;

use flagquiz_core::model::MasterySet;
use storage::repository::{MasteryRecordRepository, StorageError};

use crate::error::PersistenceFailure;

/// Loads and saves the mastery set through a record repository.
#[derive(Clone)]
pub struct MasteryStore {
    repo: Arc<dyn MasteryRecordRepository>,
}

impl MasteryStore {
    #[must_use]
    pub fn new(repo: Arc<dyn MasteryRecordRepository>) -> Self {
        Self { repo }
    }

    /// Load the persisted set. A missing record is the empty set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the repository cannot be read.
    pub async fn load(&self) -> Result<MasterySet, StorageError> {
        let record = self.repo.read_record().await?;
        Ok(record
            .as_deref()
            .map(MasterySet::decode)
            .unwrap_or_default())
    }

    /// Persist the set. Saving the same set twice stores the same record.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailure` if the write did not complete; callers keep
    /// using their in-memory set.
    pub async fn save(&self, mastered: &MasterySet) -> Result<(), PersistenceFailure> {
        self.repo.write_record(&mastered.encode()).await?;
        Ok(())
    }

    /// Clear all progress, persisting the empty record.
    ///
    /// The empty set is returned even if persisting it fails.
    pub async fn reset(&self) -> (MasterySet, Result<(), PersistenceFailure>) {
        let cleared = MasterySet::new();
        let saved = self.save(&cleared).await;
        (cleared, saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagquiz_core::model::ItemId;
    use storage::repository::InMemoryRepository;

    fn store(repo: &InMemoryRepository) -> MasteryStore {
        MasteryStore::new(Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn missing_record_loads_empty() {
        let repo = InMemoryRepository::new();
        assert!(store(&repo).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_record_loads_empty_not_singleton() {
        let repo = InMemoryRepository::with_record("");
        let loaded = store(&repo).load().await.unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.len(), 0);
    }

    #[tokio::test]
    async fn save_then_load_returns_same_set() {
        let repo = InMemoryRepository::new();
        let store = store(&repo);
        let mastered: MasterySet = ["Laos", "Mali", "Oman"]
            .into_iter()
            .map(|id| ItemId::new(id).unwrap())
            .collect();

        store.save(&mastered).await.unwrap();
        store.save(&mastered).await.unwrap();

        assert_eq!(store.load().await.unwrap(), mastered);
        assert_eq!(
            repo.read_record().await.unwrap().as_deref(),
            Some("Laos|Mali|Oman")
        );
    }

    #[tokio::test]
    async fn reset_persists_empty_record() {
        let repo = InMemoryRepository::with_record("Peru|Chad");
        let store = store(&repo);

        let (cleared, saved) = store.reset().await;
        assert!(cleared.is_empty());
        assert!(saved.is_ok());
        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(repo.read_record().await.unwrap().as_deref(), Some(""));
    }
}
