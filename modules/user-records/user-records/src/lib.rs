//! User Records Module Implementation
//!
//! Users, salaries and job information over `SeaORM`:
//! - `infra::storage` — storage context, generic repository, entities, migrations
//! - `domain` — the record service behind every route
//! - `api::rest` — axum router, DTOs, problem responses, `OpenAPI` document
//!
//! The record models live in `user-records-sdk` and are re-exported here.

#[cfg(not(any(feature = "sqlite", feature = "pg")))]
compile_error!("enable at least one database backend feature: `sqlite` or `pg`");

pub use user_records_sdk::{NewUser, User, UserJobInfo, UserSalary};

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use config::{DatabaseConfig, PoolConfig, RetryConfig};
pub use domain::error::DomainError;
pub use domain::service::RecordsService;
pub use infra::storage::{Record, RecordKind, Repository, StorageContext, StorageError};
