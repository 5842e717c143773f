use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::classes::entities::Class;
use crate::models::users::entities::User;

// 选课记录（学生 - 班级）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

/// 存储层返回的选课记录及其关联实体
#[derive(Debug, Clone)]
pub struct EnrollmentDetail {
    pub enrollment: Enrollment,
    pub student: User,
    pub class: Class,
}
