use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use super::entities::{AttendanceDetail, AttendanceStatus};
use crate::models::classes::entities::ClassSummary;
use crate::models::users::entities::UserSummary;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceResponse {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub class_id: i64,
    pub class_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub marked_by_id: Option<i64>,
    pub marked_by_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub student: UserSummary,
    pub class: ClassSummary,
}

impl From<AttendanceDetail> for AttendanceResponse {
    fn from(detail: AttendanceDetail) -> Self {
        let student = UserSummary::from(&detail.student);
        let class = ClassSummary::from(&detail.class);
        Self {
            id: detail.record.id,
            student_id: detail.student.id,
            student_name: detail.student.full_name,
            student_email: detail.student.email,
            class_id: detail.class.id,
            class_name: detail.class.name,
            date: detail.record.date,
            status: detail.record.status,
            notes: detail.record.notes,
            marked_by_id: detail.record.marked_by,
            marked_by_name: detail.marked_by.map(|u| u.full_name),
            created_at: detail.record.created_at,
            updated_at: detail.record.updated_at,
            student,
            class,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceListResponse {
    pub items: Vec<AttendanceResponse>,
}

impl From<Vec<AttendanceDetail>> for AttendanceListResponse {
    fn from(details: Vec<AttendanceDetail>) -> Self {
        Self {
            items: details.into_iter().map(AttendanceResponse::from).collect(),
        }
    }
}
