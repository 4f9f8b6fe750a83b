//! Binding between SDK record types and their `SeaORM` entities.
//!
//! [`Record`] is what makes the repository and the storage context generic:
//! each record type names its entity, its kind, and how to stage itself for
//! a write. Staged rows are kept as [`StagedRow`] so a single unit of work can
//! mix inserts, updates and deletes of every mapped table.

use std::fmt;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityName, EntityTrait,
    IdenStatic, IntoActiveModel, Iterable, QueryFilter, Statement,
};
use user_records_sdk::models::{User, UserJobInfo, UserSalary};

use super::entity::{user_job_info, user_salary, users};

/// The mapped record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    User,
    UserSalary,
    UserJobInfo,
}

impl RecordKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::UserSalary => "UserSalary",
            Self::UserJobInfo => "UserJobInfo",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `SeaORM` entity keyed by a single integer id column.
pub trait RecordEntity: EntityTrait {
    type Active: ActiveModelTrait<Entity = Self> + From<Self::Model> + Send;

    /// Whether the backend assigns the id when the staged id is `0`.
    const AUTO_ID: bool;

    fn id_column() -> Self::Column;
}

impl RecordEntity for users::Entity {
    type Active = users::ActiveModel;
    const AUTO_ID: bool = true;

    fn id_column() -> Self::Column {
        users::Column::UserId
    }
}

impl RecordEntity for user_salary::Entity {
    type Active = user_salary::ActiveModel;
    const AUTO_ID: bool = false;

    fn id_column() -> Self::Column {
        user_salary::Column::UserId
    }
}

impl RecordEntity for user_job_info::Entity {
    type Active = user_job_info::ActiveModel;
    const AUTO_ID: bool = false;

    fn id_column() -> Self::Column {
        user_job_info::Column::UserId
    }
}

/// An SDK record type that the repository can persist.
pub trait Record: Clone + Send + Sync + 'static {
    type Entity: RecordEntity;
    const KIND: RecordKind;

    fn id(&self) -> i32;

    fn from_model(model: <Self::Entity as EntityTrait>::Model) -> Self;

    fn into_row(self) -> StagedRow;
}

impl Record for User {
    type Entity = users::Entity;
    const KIND: RecordKind = RecordKind::User;

    fn id(&self) -> i32 {
        self.user_id
    }

    fn from_model(model: users::Model) -> Self {
        model.into()
    }

    fn into_row(self) -> StagedRow {
        StagedRow::User(self.into())
    }
}

impl Record for UserSalary {
    type Entity = user_salary::Entity;
    const KIND: RecordKind = RecordKind::UserSalary;

    fn id(&self) -> i32 {
        self.user_id
    }

    fn from_model(model: user_salary::Model) -> Self {
        model.into()
    }

    fn into_row(self) -> StagedRow {
        StagedRow::Salary(self.into())
    }
}

impl Record for UserJobInfo {
    type Entity = user_job_info::Entity;
    const KIND: RecordKind = RecordKind::UserJobInfo;

    fn id(&self) -> i32 {
        self.user_id
    }

    fn from_model(model: user_job_info::Model) -> Self {
        model.into()
    }

    fn into_row(self) -> StagedRow {
        StagedRow::JobInfo(self.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// A row waiting in the staging area.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedRow {
    User(users::Model),
    Salary(user_salary::Model),
    JobInfo(user_job_info::Model),
}

impl StagedRow {
    /// Execute the change on `conn`, returning the number of affected rows.
    pub(crate) async fn apply<C>(self, op: ChangeOp, conn: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        match self {
            Self::User(m) => {
                let id = m.user_id;
                apply_change::<users::Entity, C>(op, id, m, conn).await
            }
            Self::Salary(m) => {
                let id = m.user_id;
                apply_change::<user_salary::Entity, C>(op, id, m, conn).await
            }
            Self::JobInfo(m) => {
                let id = m.user_id;
                apply_change::<user_job_info::Entity, C>(op, id, m, conn).await
            }
        }
    }
}

/// One pending change: what to do and to which row.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedChange {
    pub op: ChangeOp,
    pub row: StagedRow,
}

async fn apply_change<E, C>(op: ChangeOp, id: i32, model: E::Model, conn: &C) -> Result<u64, DbErr>
where
    E: RecordEntity,
    E::Model: IntoActiveModel<E::Active>,
    C: ConnectionTrait,
{
    match op {
        ChangeOp::Insert => {
            let mut am = E::Active::from(model);
            for col in E::Column::iter() {
                if let Some(v) = am.get(col).into_value() {
                    am.set(col, v);
                }
            }
            let explicit_id = !(E::AUTO_ID && id == 0);
            if !explicit_id {
                am.not_set(E::id_column());
            }
            let rows = E::insert(am).exec_without_returning(conn).await?;

            // Keep the Postgres key sequence ahead of explicitly inserted ids.
            if E::AUTO_ID
                && explicit_id
                && conn.get_database_backend() == DbBackend::Postgres
            {
                let sql = sequence_sync_sql(E::default().table_name(), E::id_column().as_str());
                conn.execute(Statement::from_string(DbBackend::Postgres, sql))
                    .await?;
            }
            Ok(rows)
        }
        ChangeOp::Delete => {
            let res = E::delete_many()
                .filter(E::id_column().eq(id))
                .exec(conn)
                .await?;
            Ok(res.rows_affected)
        }
        ChangeOp::Update => {
            let Some(existing) = E::find()
                .filter(E::id_column().eq(id))
                .one(conn)
                .await?
            else {
                return Ok(0);
            };

            let incoming = E::Active::from(model);
            let mut am = E::Active::from(existing);
            for col in E::Column::iter() {
                let new_value = incoming.get(col).into_value();
                if am.get(col).into_value() != new_value
                    && let Some(v) = new_value
                {
                    am.set(col, v);
                }
            }

            if !am.is_changed() {
                return Ok(0);
            }

            let res = E::update_many()
                .set(am)
                .filter(E::id_column().eq(id))
                .exec(conn)
                .await?;
            Ok(res.rows_affected)
        }
    }
}

/// Move a serial column's sequence past the largest stored key.
fn sequence_sync_sql(table: &str, column: &str) -> String {
    format!(
        "SELECT setval(pg_get_serial_sequence('{table}', '{column}'), \
         (SELECT COALESCE(MAX({column}), 1) FROM {table}))"
    )
}
