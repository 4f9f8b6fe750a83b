//! Pool construction for the supported backends.

use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use super::error::{StorageError, StorageResult};
use crate::config::PoolConfig;

/// Backend selected from the DSN scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Sqlite,
    Postgres,
}

impl Engine {
    /// Detect the backend from a DSN.
    ///
    /// # Errors
    /// Returns `StorageError::Configuration` for an empty or unrecognized DSN.
    pub fn detect(dsn: &str) -> StorageResult<Self> {
        let s = dsn.trim_start();
        if s.is_empty() {
            return Err(StorageError::configuration("connection string is empty"));
        }

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            Err(StorageError::configuration(format!(
                "unrecognized connection string scheme: {}",
                redact(s)
            )))
        }
    }
}

/// Open a pooled connection for `dsn`.
///
/// # Errors
/// Returns `StorageError::Configuration` when the DSN is malformed or the
/// backend's feature is disabled, and `StorageError::Persistence` when the
/// database cannot be reached.
pub async fn connect(dsn: &str, pool: &PoolConfig) -> StorageResult<DatabaseConnection> {
    let dsn = dsn.trim();
    let engine = Engine::detect(dsn)?;
    debug!(?engine, dsn = %redact(dsn), "opening database pool");

    let conn = match engine {
        #[cfg(feature = "sqlite")]
        Engine::Sqlite => sqlite::connect(dsn, pool).await?,
        #[cfg(not(feature = "sqlite"))]
        Engine::Sqlite => {
            return Err(StorageError::configuration("SQLite feature not enabled"));
        }
        #[cfg(feature = "pg")]
        Engine::Postgres => postgres::connect(dsn, pool).await?,
        #[cfg(not(feature = "pg"))]
        Engine::Postgres => {
            return Err(StorageError::configuration("PostgreSQL feature not enabled"));
        }
    };

    info!(?engine, "database pool ready");
    Ok(conn)
}

/// `true` for DSNs that open a private in-memory `SQLite` database.
#[must_use]
pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Strip credentials from a DSN before it is logged or printed.
#[must_use]
pub fn redact(dsn: &str) -> String {
    match (dsn.find("://"), dsn.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &dsn[..scheme_end], &dsn[at..])
        }
        _ => dsn.to_owned(),
    }
}

fn sql_err(err: sea_orm::sqlx::Error) -> StorageError {
    match err {
        sea_orm::sqlx::Error::Configuration(e) => StorageError::configuration(e.to_string()),
        other => StorageError::Persistence(sea_orm::DbErr::Conn(sea_orm::RuntimeErr::SqlxError(
            other,
        ))),
    }
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use std::path::Path;
    use std::str::FromStr;

    use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sea_orm::{DatabaseConnection, SqlxSqliteConnector};

    use super::{is_memory_dsn, sql_err};
    use crate::config::PoolConfig;
    use crate::infra::storage::error::{StorageError, StorageResult};

    pub(super) async fn connect(dsn: &str, pool: &PoolConfig) -> StorageResult<DatabaseConnection> {
        let memory = is_memory_dsn(dsn);

        let mut opts = SqliteConnectOptions::from_str(dsn)
            .map_err(sql_err)?
            .create_if_missing(true);
        if let Some(t) = pool.busy_timeout {
            opts = opts.busy_timeout(t);
        }

        if !memory {
            ensure_parent_dir(opts.get_filename())?;
        }

        let mut o = SqlitePoolOptions::new().acquire_timeout(pool.acquire_timeout);
        if memory {
            // Every connection to `:memory:` sees its own database, so the
            // pool is pinned to a single connection that never expires.
            o = o
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            o = o.max_connections(pool.max_conns);
            if let Some(n) = pool.min_conns {
                o = o.min_connections(n);
            }
            if let Some(t) = pool.idle_timeout {
                o = o.idle_timeout(t);
            }
            if let Some(t) = pool.max_lifetime {
                o = o.max_lifetime(t);
            }
        }

        let pool = o.connect_with(opts).await.map_err(sql_err)?;
        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::configuration(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Ok(())
    }
}

#[cfg(feature = "pg")]
mod postgres {
    use sea_orm::sqlx::postgres::PgPoolOptions;
    use sea_orm::{DatabaseConnection, SqlxPostgresConnector};

    use super::sql_err;
    use crate::config::PoolConfig;
    use crate::infra::storage::error::StorageResult;

    pub(super) async fn connect(dsn: &str, pool: &PoolConfig) -> StorageResult<DatabaseConnection> {
        let mut o = PgPoolOptions::new()
            .max_connections(pool.max_conns)
            .acquire_timeout(pool.acquire_timeout);
        if let Some(n) = pool.min_conns {
            o = o.min_connections(n);
        }
        if let Some(t) = pool.idle_timeout {
            o = o.idle_timeout(t);
        }
        if let Some(t) = pool.max_lifetime {
            o = o.max_lifetime(t);
        }

        let pool = o.connect(dsn).await.map_err(sql_err)?;
        Ok(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
    }
}
