//! User Records SDK
//!
//! Transport-agnostic record types for the user-records module:
//! - `User`, `UserSalary`, `UserJobInfo` — one per mapped table
//! - `NewUser` — insert payload for a user whose id is assigned by the backend

#![forbid(unsafe_code)]

pub mod models;

pub use models::{NewUser, User, UserJobInfo, UserSalary};
