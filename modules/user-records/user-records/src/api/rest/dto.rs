use serde::{Deserialize, Serialize};
use user_records_sdk::models::{NewUser, User, UserJobInfo, UserSalary};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub active: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            gender: user.gender,
            active: user.active,
        }
    }
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        Self {
            user_id: dto.user_id,
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            gender: dto.gender,
            active: dto.active,
        }
    }
}

/// Payload for creating a user; the id is assigned by the database.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUserDto {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub active: bool,
}

impl From<NewUserDto> for NewUser {
    fn from(dto: NewUserDto) -> Self {
        Self {
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            gender: dto.gender,
            active: dto.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSalaryDto {
    pub user_id: i32,
    pub salary: f64,
}

impl From<UserSalary> for UserSalaryDto {
    fn from(salary: UserSalary) -> Self {
        Self {
            user_id: salary.user_id,
            salary: salary.salary,
        }
    }
}

impl From<UserSalaryDto> for UserSalary {
    fn from(dto: UserSalaryDto) -> Self {
        Self {
            user_id: dto.user_id,
            salary: dto.salary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserJobInfoDto {
    pub user_id: i32,
    pub job_title: String,
    pub department: String,
}

impl From<UserJobInfo> for UserJobInfoDto {
    fn from(info: UserJobInfo) -> Self {
        Self {
            user_id: info.user_id,
            job_title: info.job_title,
            department: info.department,
        }
    }
}

impl From<UserJobInfoDto> for UserJobInfo {
    fn from(dto: UserJobInfoDto) -> Self {
        Self {
            user_id: dto.user_id,
            job_title: dto.job_title,
            department: dto.department,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserIdQuery {
    pub user_id: i32,
}
