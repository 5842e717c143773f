use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use super::entities::MarkDetail;
use crate::models::classes::entities::ClassSummary;
use crate::models::subjects::entities::SubjectSummary;
use crate::models::users::entities::UserSummary;
use crate::utils::decimal::to_f64;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct MarkResponse {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub class_id: i64,
    pub class_name: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub exam_type: String,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub grade: String,
    pub exam_date: NaiveDate,
    pub notes: Option<String>,
    pub graded_by_id: Option<i64>,
    pub graded_by_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub student: UserSummary,
    pub class: ClassSummary,
    pub subject: SubjectSummary,
}

impl From<MarkDetail> for MarkResponse {
    fn from(detail: MarkDetail) -> Self {
        let student = UserSummary::from(&detail.student);
        let class = ClassSummary::from(&detail.class);
        let subject = SubjectSummary::from(&detail.subject);
        let percentage = detail.mark.percentage();
        let grade = detail.mark.grade().to_string();
        Self {
            id: detail.mark.id,
            student_id: detail.student.id,
            student_name: detail.student.full_name,
            class_id: detail.class.id,
            class_name: detail.class.name,
            subject_id: detail.subject.id,
            subject_name: detail.subject.name,
            exam_type: detail.mark.exam_type,
            score: to_f64(detail.mark.score),
            max_score: to_f64(detail.mark.max_score),
            percentage,
            grade,
            exam_date: detail.mark.exam_date,
            notes: detail.mark.notes,
            graded_by_id: detail.mark.graded_by,
            graded_by_name: detail.graded_by.map(|u| u.full_name),
            created_at: detail.mark.created_at,
            updated_at: detail.mark.updated_at,
            student,
            class,
            subject,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct MarkListResponse {
    pub items: Vec<MarkResponse>,
}

impl From<Vec<MarkDetail>> for MarkListResponse {
    fn from(details: Vec<MarkDetail>) -> Self {
        Self {
            items: details.into_iter().map(MarkResponse::from).collect(),
        }
    }
}

// 平均分响应，无成绩时 average 为 null
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct AverageResponse {
    pub student_id: Option<i64>,
    pub class_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub average: Option<f64>,
}
