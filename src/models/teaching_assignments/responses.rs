use serde::Serialize;
use ts_rs::TS;

use super::entities::TeachingAssignmentDetail;
use crate::models::classes::entities::ClassSummary;
use crate::models::subjects::entities::SubjectSummary;
use crate::models::users::entities::UserSummary;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teaching_assignment.ts")]
pub struct TeachingAssignmentResponse {
    pub id: i64,
    pub teacher_id: i64,
    pub teacher_name: String,
    pub class_id: i64,
    pub class_name: String,
    pub academic_year: String,
    pub subject_id: Option<i64>,
    pub subject_name: Option<String>,
    pub student_count: i64,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
    pub teacher: UserSummary,
    pub class: ClassSummary,
    pub subject: Option<SubjectSummary>,
}

impl From<TeachingAssignmentDetail> for TeachingAssignmentResponse {
    fn from(detail: TeachingAssignmentDetail) -> Self {
        let teacher = UserSummary::from(&detail.teacher);
        let class = ClassSummary::from(&detail.class);
        let subject = detail.subject.as_ref().map(SubjectSummary::from);
        Self {
            id: detail.assignment.id,
            teacher_id: detail.teacher.id,
            teacher_name: detail.teacher.full_name,
            class_id: detail.class.id,
            class_name: detail.class.name,
            academic_year: detail.class.academic_year,
            subject_id: detail.assignment.subject_id,
            subject_name: detail.subject.map(|s| s.name),
            student_count: detail.student_count,
            assigned_at: detail.assignment.assigned_at,
            teacher,
            class,
            subject,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teaching_assignment.ts")]
pub struct TeachingAssignmentListResponse {
    pub items: Vec<TeachingAssignmentResponse>,
}

impl From<Vec<TeachingAssignmentDetail>> for TeachingAssignmentListResponse {
    fn from(details: Vec<TeachingAssignmentDetail>) -> Self {
        Self {
            items: details
                .into_iter()
                .map(TeachingAssignmentResponse::from)
                .collect(),
        }
    }
}
