//! Public models for the user-records module.
//!
//! These are transport-agnostic data structures shared by the storage layer,
//! the domain service and the REST API. Every record is keyed by `user_id`.

/// A user row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    /// Primary key. `0` lets the backend assign the id on insert.
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub active: bool,
}

/// Salary row, sharing the identifier space of [`User`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserSalary {
    pub user_id: i32,
    pub salary: f64,
}

/// Job information row, sharing the identifier space of [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserJobInfo {
    pub user_id: i32,
    pub job_title: String,
    pub department: String,
}

/// Data for creating a user; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub active: bool,
}

impl From<NewUser> for User {
    fn from(new: NewUser) -> Self {
        Self {
            user_id: 0,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            gender: new.gender,
            active: new.active,
        }
    }
}
