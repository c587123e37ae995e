use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::{EnrollmentReason, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Account {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudentProfile {
    pub(crate) account_id: String,
    pub(crate) class_id: Option<String>,
    pub(crate) parent_phone: Option<String>,
    pub(crate) parent_email: Option<String>,
    pub(crate) parent_full_name: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TeacherProfile {
    pub(crate) account_id: String,
    pub(crate) class_id: Option<String>,
    pub(crate) degree: Option<String>,
    pub(crate) experience_years: Option<i32>,
    pub(crate) bio: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Invite {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) token: String,
    pub(crate) expires_at: PrimitiveDateTime,
    pub(crate) used_at: Option<PrimitiveDateTime>,
    pub(crate) is_sent: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Derived invite state; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum InviteStatus {
    Pending,
    Used,
    Expired,
}

impl Invite {
    pub(crate) fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub(crate) fn is_expired(&self, now: PrimitiveDateTime) -> bool {
        !self.is_used() && now > self.expires_at
    }

    pub(crate) fn status(&self, now: PrimitiveDateTime) -> InviteStatus {
        if self.is_used() {
            InviteStatus::Used
        } else if self.is_expired(now) {
            InviteStatus::Expired
        } else {
            InviteStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Class {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct EnrollmentRecord {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) class_id: Option<String>,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) ended_at: Option<PrimitiveDateTime>,
    pub(crate) reason: EnrollmentReason,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ClassTransferRecord {
    pub(crate) id: String,
    pub(crate) from_class_id: String,
    pub(crate) to_class_id: String,
    pub(crate) promotion_date: Date,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AcademicYear {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) is_current: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AcademicPeriod {
    pub(crate) id: String,
    pub(crate) year_id: String,
    pub(crate) name: String,
    pub(crate) order_num: i32,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) is_current: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AcademicWeek {
    pub(crate) id: String,
    pub(crate) period_id: String,
    pub(crate) week_num: i32,
    pub(crate) name: String,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) is_holiday: bool,
    pub(crate) is_current: bool,
    pub(crate) created_at: PrimitiveDateTime,
}
