use super::entities::ClassWithStudentCount;
use serde::Serialize;
use ts_rs::TS;

// 班级列表响应（按名称排序）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassListResponse {
    pub items: Vec<ClassWithStudentCount>,
}
