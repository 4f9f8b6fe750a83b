//! `SeaORM` entity definitions, one per mapped table.

pub mod user_job_info;
pub mod user_salary;
pub mod users;
