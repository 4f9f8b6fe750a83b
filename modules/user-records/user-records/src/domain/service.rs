use tracing::{debug, info, instrument};

use crate::config::DatabaseConfig;
use crate::domain::error::DomainError;
use crate::infra::storage::{Record, Repository, StorageContext};

/// Record operations behind the REST routes.
///
/// Holds the configured root storage context; every call runs in its own
/// session so staged changes never cross requests.
pub struct RecordsService {
    storage: StorageContext,
}

impl RecordsService {
    #[must_use]
    pub fn new(storage: StorageContext) -> Self {
        Self { storage }
    }

    /// Configure a fresh storage context and wrap it.
    ///
    /// # Errors
    /// `DomainError::Configuration` when the database cannot be bound.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let storage = StorageContext::new();
        storage.configure(config).await?;
        Ok(Self::new(storage))
    }

    fn repository(&self) -> Repository {
        Repository::new(self.storage.session())
    }

    #[instrument(name = "records.list", skip(self), fields(kind = %K::KIND))]
    pub async fn list<K: Record>(&self) -> Result<Vec<K>, DomainError> {
        let records = self.repository().list::<K>().await?;
        debug!(count = records.len(), "listed records");
        Ok(records)
    }

    #[instrument(name = "records.get", skip(self), fields(kind = %K::KIND))]
    pub async fn get<K: Record>(&self, id: i32) -> Result<K, DomainError> {
        Ok(self.repository().find_by_id::<K>(id).await?)
    }

    #[instrument(name = "records.create", skip_all, fields(kind = %K::KIND, id = record.id()))]
    pub async fn create<K: Record>(&self, record: K) -> Result<(), DomainError> {
        let id = record.id();
        let mut repo = self.repository();
        repo.add(record);
        if !repo.save().await? {
            return Err(DomainError::nothing_written(K::KIND.name(), id));
        }

        info!("record created");
        Ok(())
    }

    /// Apply `mutate` to the stored record and persist the result.
    ///
    /// A mutation that leaves the record unchanged succeeds without a write.
    #[instrument(name = "records.update", skip(self, mutate), fields(kind = %K::KIND))]
    pub async fn update<K, F>(&self, id: i32, mutate: F) -> Result<K, DomainError>
    where
        K: Record + PartialEq,
        F: FnOnce(&mut K) + Send,
    {
        let mut repo = self.repository();
        let current = repo.find_by_id::<K>(id).await?;

        let mut updated = current.clone();
        mutate(&mut updated);
        if updated == current {
            debug!("record already up to date");
            return Ok(current);
        }

        repo.update(updated.clone());
        if !repo.save().await? {
            return Err(DomainError::nothing_written(K::KIND.name(), id));
        }

        info!("record updated");
        Ok(updated)
    }

    #[instrument(name = "records.delete", skip(self), fields(kind = %K::KIND))]
    pub async fn delete<K: Record>(&self, id: i32) -> Result<(), DomainError> {
        let mut repo = self.repository();
        let current = repo.find_by_id::<K>(id).await?;

        repo.remove(current);
        if !repo.save().await? {
            return Err(DomainError::nothing_written(K::KIND.name(), id));
        }

        info!("record deleted");
        Ok(())
    }
}
