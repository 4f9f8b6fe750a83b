use tracing::debug;

use super::context::StorageContext;
use super::error::{StorageError, StorageResult};
use super::record::{ChangeOp, Record};

/// Uniform CRUD over one storage session for every record kind.
///
/// `add`, `remove` and `update` only stage; nothing is durable until
/// [`save`](Self::save).
pub struct Repository {
    ctx: StorageContext,
}

impl Repository {
    #[must_use]
    pub fn new(ctx: StorageContext) -> Self {
        Self { ctx }
    }

    /// Stage an insert. `None` is ignored.
    pub fn add<K: Record>(&mut self, entity: impl Into<Option<K>>) {
        if let Some(entity) = entity.into() {
            self.ctx.stage(ChangeOp::Insert, entity);
        }
    }

    /// Stage a delete by primary key. `None` is ignored.
    pub fn remove<K: Record>(&mut self, entity: impl Into<Option<K>>) {
        if let Some(entity) = entity.into() {
            self.ctx.stage(ChangeOp::Delete, entity);
        }
    }

    /// Stage the new value of an existing row. `None` is ignored.
    pub fn update<K: Record>(&mut self, entity: impl Into<Option<K>>) {
        if let Some(entity) = entity.into() {
            self.ctx.stage(ChangeOp::Update, entity);
        }
    }

    /// # Errors
    /// `StorageError::NotFound` when no row has this id.
    pub async fn find_by_id<K: Record>(&self, id: i32) -> StorageResult<K> {
        self.ctx
            .table::<K>()?
            .by_id(id)
            .first()
            .await?
            .ok_or(StorageError::NotFound { kind: K::KIND, id })
    }

    /// All rows of `K`, ordered by id.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub async fn list<K: Record>(&self) -> StorageResult<Vec<K>> {
        self.ctx.table::<K>()?.to_list().await
    }

    /// Commit staged changes; `true` only if at least one row was affected.
    ///
    /// # Errors
    /// Propagates commit failures.
    pub async fn save(&mut self) -> StorageResult<bool> {
        let rows = self.ctx.save().await?;
        debug!(rows, "repository save");
        Ok(rows > 0)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.ctx.pending()
    }
}
