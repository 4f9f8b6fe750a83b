use user_records_sdk::models::{User, UserJobInfo, UserSalary};

use super::entity::{user_job_info, user_salary, users};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            user_id: model.user_id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            gender: model.gender,
            active: model.active,
        }
    }
}

impl From<User> for users::Model {
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

impl From<user_salary::Model> for UserSalary {
    fn from(model: user_salary::Model) -> Self {
        Self {
            user_id: model.user_id,
            salary: model.salary,
        }
    }
}

impl From<UserSalary> for user_salary::Model {
    fn from(salary: UserSalary) -> Self {
        Self {
            user_id: salary.user_id,
            salary: salary.salary,
        }
    }
}

impl From<user_job_info::Model> for UserJobInfo {
    fn from(model: user_job_info::Model) -> Self {
        Self {
            user_id: model.user_id,
            job_title: model.job_title,
            department: model.department,
        }
    }
}

impl From<UserJobInfo> for user_job_info::Model {
    fn from(info: UserJobInfo) -> Self {
        Self {
            user_id: info.user_id,
            job_title: info.job_title,
            department: info.department,
        }
    }
}
