use serde::Serialize;
use ts_rs::TS;

use super::entities::EnrollmentDetail;
use crate::models::classes::entities::ClassSummary;
use crate::models::users::entities::UserSummary;

// 选课响应：平铺的显示字段 + 嵌套摘要
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct EnrollmentResponse {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub class_id: i64,
    pub class_name: String,
    pub academic_year: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub student: UserSummary,
    pub class: ClassSummary,
}

impl From<EnrollmentDetail> for EnrollmentResponse {
    fn from(detail: EnrollmentDetail) -> Self {
        let student = UserSummary::from(&detail.student);
        let class = ClassSummary::from(&detail.class);
        Self {
            id: detail.enrollment.id,
            student_id: detail.student.id,
            student_name: detail.student.full_name,
            student_email: detail.student.email,
            class_id: detail.class.id,
            class_name: detail.class.name,
            academic_year: detail.class.academic_year,
            enrolled_at: detail.enrollment.enrolled_at,
            student,
            class,
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct EnrollmentListResponse {
    pub items: Vec<EnrollmentResponse>,
}

impl From<Vec<EnrollmentDetail>> for EnrollmentListResponse {
    fn from(details: Vec<EnrollmentDetail>) -> Self {
        Self {
            items: details.into_iter().map(EnrollmentResponse::from).collect(),
        }
    }
}
