use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teaching_assignment.ts")]
pub struct AssignTeacherRequest {
    pub teacher_id: i64,
    pub class_id: i64,
    pub subject_id: Option<i64>,
}
