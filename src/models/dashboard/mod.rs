use serde::Serialize;
use ts_rs::TS;

// 管理员仪表盘统计
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_teachers: i64,
    pub total_classes: i64,
    pub total_subjects: i64,
}
