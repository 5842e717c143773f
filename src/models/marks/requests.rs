use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

// 新增成绩请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct AddMarkRequest {
    pub student_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub exam_type: String,
    pub score: f64,
    /// 默认 100
    pub max_score: Option<f64>,
    /// 默认当天
    pub exam_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

// 更新成绩请求：exam_type 与 score 总是覆盖，其余字段仅在提供时覆盖
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct UpdateMarkRequest {
    pub exam_type: String,
    pub score: f64,
    pub max_score: Option<f64>,
    pub exam_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
