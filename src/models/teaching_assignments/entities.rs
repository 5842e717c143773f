use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::classes::entities::Class;
use crate::models::subjects::entities::Subject;
use crate::models::users::entities::User;

// 授课分配（教师 - 班级 - 可选科目）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teaching_assignment.ts")]
pub struct TeachingAssignment {
    pub id: i64,
    pub teacher_id: i64,
    pub class_id: i64,
    pub subject_id: Option<i64>,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

/// 存储层返回的授课分配及其关联实体
#[derive(Debug, Clone)]
pub struct TeachingAssignmentDetail {
    pub assignment: TeachingAssignment,
    pub teacher: User,
    pub class: Class,
    pub subject: Option<Subject>,
    /// 班级当前在读学生数
    pub student_count: i64,
}
