//! The storage context: one shared pool plus a per-session staging area.
//!
//! A context is configured once with a [`DatabaseConfig`]. Sessions created
//! from it share the pool but keep their own list of staged changes, which
//! [`StorageContext::save`] flushes in a single transaction.

use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::sea_query::IntoCondition;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Select,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use super::connect;
use super::error::{StorageError, StorageResult};
use super::migrations::Migrator;
use super::record::{ChangeOp, Record, RecordEntity, StagedChange};
use super::retry::RetryPolicy;
use crate::config::DatabaseConfig;

struct Backend {
    conn: DatabaseConnection,
    retry: RetryPolicy,
}

impl Backend {
    async fn open(config: &DatabaseConfig) -> StorageResult<Self> {
        let dsn = config
            .dsn
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                StorageError::configuration("DefaultConnection connection string is missing")
            })?;

        let conn = connect::connect(dsn, &config.pool)
            .await
            .map_err(|e| match e {
                StorageError::Persistence(db) => {
                    StorageError::configuration(format!("database connection failed: {db}"))
                }
                other => other,
            })?;

        if config.auto_migrate {
            Migrator::up(&conn, None).await.map_err(|e| {
                StorageError::configuration(format!("schema migration failed: {e}"))
            })?;
            debug!("schema migrations applied");
        }

        Ok(Self {
            conn,
            retry: RetryPolicy::new(config.retry.clone()),
        })
    }
}

/// Shared database session with a unit-of-work staging area.
#[derive(Default)]
pub struct StorageContext {
    backend: Arc<OnceCell<Backend>>,
    staged: Vec<StagedChange>,
}

impl StorageContext {
    /// An unconfigured context; call [`configure`](Self::configure) before use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the context to a database. Only the first call has an effect.
    ///
    /// # Errors
    /// `StorageError::Configuration` when the connection string is missing or
    /// malformed, the database cannot be opened, or the schema cannot be
    /// created.
    #[instrument(name = "storage.configure", skip_all)]
    pub async fn configure(&self, config: &DatabaseConfig) -> StorageResult<()> {
        if self.backend.initialized() {
            debug!("storage context already configured");
            return Ok(());
        }

        self.backend
            .get_or_try_init(|| Backend::open(config))
            .await?;
        info!("storage context configured");
        Ok(())
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.backend.initialized()
    }

    /// A new session over the same pool with an empty staging area.
    #[must_use]
    pub fn session(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            staged: Vec::new(),
        }
    }

    /// Query access to the record set of `K`.
    ///
    /// # Errors
    /// `StorageError::Configuration` if the context was never configured.
    pub fn table<K: Record>(&self) -> StorageResult<Table<'_, K>> {
        let backend = self.backend()?;
        Ok(Table {
            conn: &backend.conn,
            retry: &backend.retry,
            select: K::Entity::find(),
            _record: PhantomData,
        })
    }

    pub fn stage<K: Record>(&mut self, op: ChangeOp, record: K) {
        debug!(kind = %K::KIND, id = record.id(), ?op, "staging change");
        self.staged.push(StagedChange {
            op,
            row: record.into_row(),
        });
    }

    /// Number of staged changes.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    /// Drop every staged change without touching the database.
    pub fn discard(&mut self) {
        self.staged.clear();
    }

    /// Flush every staged change in one transaction.
    ///
    /// Returns the total number of affected rows (`0` when nothing was staged).
    /// Transient failures retry the whole transaction; the staging area is
    /// cleared only once the commit succeeds.
    ///
    /// # Errors
    /// `StorageError::Persistence` when the transaction fails, after which no
    /// staged change is visible in the database.
    #[instrument(name = "storage.save", skip_all, fields(pending = self.staged.len()))]
    pub async fn save(&mut self) -> StorageResult<u64> {
        if self.staged.is_empty() {
            return Ok(0);
        }

        let cell = Arc::clone(&self.backend);
        let backend = cell.get().ok_or_else(not_configured)?;

        let mut attempt = 0;
        loop {
            match apply_all(&backend.conn, &self.staged).await {
                Ok(rows) => {
                    self.staged.clear();
                    debug!(rows, "changes committed");
                    return Ok(rows);
                }
                Err(e) => attempt = backend.retry.backoff_or_fail("save", attempt, e).await?,
            }
        }
    }

    fn backend(&self) -> StorageResult<&Backend> {
        self.backend.get().ok_or_else(not_configured)
    }
}

fn not_configured() -> StorageError {
    StorageError::configuration("storage context is not configured")
}

async fn apply_all(conn: &DatabaseConnection, changes: &[StagedChange]) -> Result<u64, DbErr> {
    let txn = conn.begin().await?;
    let mut rows = 0;
    for change in changes {
        rows += change.row.clone().apply(change.op, &txn).await?;
    }
    txn.commit().await?;
    Ok(rows)
}

/// A query over one record set, read through the retry policy.
pub struct Table<'a, K: Record> {
    conn: &'a DatabaseConnection,
    retry: &'a RetryPolicy,
    select: Select<K::Entity>,
    _record: PhantomData<K>,
}

impl<K: Record> Table<'_, K> {
    #[must_use]
    pub fn filter<F: IntoCondition>(mut self, cond: F) -> Self {
        self.select = self.select.filter(cond);
        self
    }

    #[must_use]
    pub fn by_id(self, id: i32) -> Self {
        self.filter(<K::Entity as RecordEntity>::id_column().eq(id))
    }

    /// The first matching record, if any.
    ///
    /// # Errors
    /// `StorageError::Persistence` once retries are exhausted.
    pub async fn first(self) -> StorageResult<Option<K>> {
        let mut attempt = 0;
        loop {
            match self.select.clone().one(self.conn).await {
                Ok(model) => return Ok(model.map(K::from_model)),
                Err(e) => attempt = self.retry.backoff_or_fail("first", attempt, e).await?,
            }
        }
    }

    /// Every matching record, ordered by id.
    ///
    /// # Errors
    /// `StorageError::Persistence` once retries are exhausted.
    pub async fn to_list(self) -> StorageResult<Vec<K>> {
        let select = self
            .select
            .order_by_asc(<K::Entity as RecordEntity>::id_column());
        let mut attempt = 0;
        loop {
            match select.clone().all(self.conn).await {
                Ok(models) => return Ok(models.into_iter().map(K::from_model).collect()),
                Err(e) => attempt = self.retry.backoff_or_fail("to_list", attempt, e).await?,
            }
        }
    }
}
