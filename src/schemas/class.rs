use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::{Class, ClassTransferRecord, EnrollmentRecord, StudentProfile};
use crate::db::types::EnrollmentReason;
use crate::schemas::deserialize_date;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ClassCreate {
    #[validate(length(min = 1, max = 64, message = "name must be 1-64 characters"))]
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: String,
}

impl ClassResponse {
    pub(crate) fn from_db(class: Class) -> Self {
        Self { id: class.id, name: class.name, created_at: format_primitive(class.created_at) }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassDetailResponse {
    #[serde(flatten)]
    pub(crate) class: ClassResponse,
    pub(crate) student_ids: Vec<String>,
}

impl ClassDetailResponse {
    pub(crate) fn from_db(class: Class, students: Vec<StudentProfile>) -> Self {
        Self {
            class: ClassResponse::from_db(class),
            student_ids: students.into_iter().map(|student| student.account_id).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudentIdsRequest {
    #[serde(alias = "studentIds")]
    #[validate(length(min = 1, message = "student_ids must not be empty"))]
    pub(crate) student_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangedStudentsResponse {
    pub(crate) class_id: String,
    pub(crate) changed: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentMoveRequest {
    /// `null` leaves the student without a class.
    #[serde(default, alias = "classId")]
    pub(crate) class_id: Option<String>,
    pub(crate) reason: EnrollmentReason,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentRecordResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) class_id: Option<String>,
    pub(crate) reason: EnrollmentReason,
    pub(crate) is_active: bool,
    pub(crate) started_at: String,
    pub(crate) ended_at: Option<String>,
}

impl EnrollmentRecordResponse {
    pub(crate) fn from_db(record: EnrollmentRecord) -> Self {
        Self {
            id: record.id,
            student_id: record.student_id,
            class_id: record.class_id,
            reason: record.reason,
            is_active: record.is_active,
            started_at: format_primitive(record.started_at),
            ended_at: record.ended_at.map(format_primitive),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PromotionCreate {
    #[serde(alias = "toClassId")]
    #[validate(length(min = 1, message = "to_class_id must not be empty"))]
    pub(crate) to_class_id: String,
    #[serde(alias = "promotionDate", deserialize_with = "deserialize_date")]
    pub(crate) promotion_date: Date,
}

#[derive(Debug, Serialize)]
pub(crate) struct PromotionResponse {
    pub(crate) id: String,
    pub(crate) from_class_id: String,
    pub(crate) to_class_id: String,
    pub(crate) promotion_date: String,
    pub(crate) created_at: String,
}

impl PromotionResponse {
    pub(crate) fn from_db(record: ClassTransferRecord) -> Self {
        Self {
            id: record.id,
            from_class_id: record.from_class_id,
            to_class_id: record.to_class_id,
            promotion_date: format_date(record.promotion_date),
            created_at: format_primitive(record.created_at),
        }
    }
}
