use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::errors::AppError;
use crate::model::Record;
use crate::model::patch::Patchable;
use crate::repository::Repository;

/// CRUD orchestration for one entity type over an injected store.
pub struct RecordService<T> {
    repo: Arc<dyn Repository<T>>,
}

impl<T: Record + Patchable> RecordService<T> {
    pub fn new(repo: Arc<dyn Repository<T>>) -> Self {
        Self { repo }
    }

    fn not_found(id: u64) -> AppError {
        AppError::NotFound {
            entity: T::ENTITY,
            id,
        }
    }

    #[instrument(skip(self), fields(entity = T::ENTITY))]
    pub async fn get_all(&self) -> Result<Vec<T>, AppError> {
        Ok(self.repo.find_all().await?)
    }

    #[instrument(skip(self), fields(entity = T::ENTITY))]
    pub async fn get_by_id(&self, id: u64) -> Result<T, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    #[instrument(skip(self, record), fields(entity = T::ENTITY))]
    pub async fn create(&self, mut record: T) -> Result<T, AppError> {
        // a client-supplied id would turn the insert into an overwrite
        record.set_id(None);
        record.on_create(Utc::now());
        record.check_constraints()?;

        let saved = self.repo.save(record).await?;
        info!(id = ?saved.id(), "Record created");
        Ok(saved)
    }

    #[instrument(skip(self, record), fields(entity = T::ENTITY))]
    pub async fn update_by_id(&self, id: u64, mut record: T) -> Result<T, AppError> {
        let stored = self.get_by_id(id).await?;

        record.set_id(Some(id));
        record.keep_immutable(&stored);
        record.check_constraints()?;

        let saved = self.repo.save(record).await?;
        info!("Record replaced");
        Ok(saved)
    }

    #[instrument(skip(self), fields(entity = T::ENTITY))]
    pub async fn delete_by_id(&self, id: u64) -> Result<(), AppError> {
        if !self.repo.exists_by_id(id).await? {
            return Err(Self::not_found(id));
        }
        self.repo.delete_by_id(id).await?;
        info!("Record deleted");
        Ok(())
    }

    /// Overwrites only the attributes named in `field_map`.
    ///
    /// Reads, patches and writes without a version check: two concurrent
    /// patches of the same record resolve as last writer wins.
    #[instrument(skip(self, field_map), fields(entity = T::ENTITY))]
    pub async fn partial_update_by_id(
        &self,
        id: u64,
        field_map: Map<String, Value>,
    ) -> Result<T, AppError> {
        let stored = self.get_by_id(id).await?;

        debug!(fields = ?field_map.keys().collect::<Vec<_>>(), "Applying partial update");
        let patched = T::field_registry().apply(&stored, field_map)?;
        patched.check_constraints()?;

        let saved = self.repo.save(patched).await?;
        info!("Record patched");
        Ok(saved)
    }
}
