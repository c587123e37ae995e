use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Account, StudentProfile, TeacherProfile};
use crate::db::types::UserRole;
use crate::services::provisioning::AccountDetails;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AccountCreate {
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub(crate) username: String,
    #[serde(alias = "fullName")]
    #[validate(length(min = 1, message = "full_name must not be empty"))]
    pub(crate) full_name: String,
    pub(crate) password: String,
    #[serde(default = "default_role")]
    pub(crate) role: UserRole,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            username: account.username,
            full_name: account.full_name,
            role: account.role,
            is_active: account.is_active,
            created_at: format_primitive(account.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentProfileResponse {
    pub(crate) class_id: Option<String>,
    pub(crate) parent_phone: Option<String>,
    pub(crate) parent_email: Option<String>,
    pub(crate) parent_full_name: Option<String>,
}

impl StudentProfileResponse {
    pub(crate) fn from_db(profile: StudentProfile) -> Self {
        Self {
            class_id: profile.class_id,
            parent_phone: profile.parent_phone,
            parent_email: profile.parent_email,
            parent_full_name: profile.parent_full_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherProfileResponse {
    pub(crate) class_id: Option<String>,
    pub(crate) degree: Option<String>,
    pub(crate) experience_years: Option<i32>,
    pub(crate) bio: Option<String>,
}

impl TeacherProfileResponse {
    pub(crate) fn from_db(profile: TeacherProfile) -> Self {
        Self {
            class_id: profile.class_id,
            degree: profile.degree,
            experience_years: profile.experience_years,
            bio: profile.bio,
        }
    }
}

/// Account plus whichever role profile it owns.
#[derive(Debug, Serialize)]
pub(crate) struct UserDetailsResponse {
    #[serde(flatten)]
    pub(crate) user: UserResponse,
    pub(crate) student_profile: Option<StudentProfileResponse>,
    pub(crate) teacher_profile: Option<TeacherProfileResponse>,
}

impl UserDetailsResponse {
    pub(crate) fn from_details(details: AccountDetails) -> Self {
        Self {
            user: UserResponse::from_db(details.account),
            student_profile: details.student.map(StudentProfileResponse::from_db),
            teacher_profile: details.teacher.map(TeacherProfileResponse::from_db),
        }
    }
}

fn default_role() -> UserRole {
    UserRole::Student
}
