use serde::Deserialize;
use ts_rs::TS;

// 班级查询参数
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassQueryParams {
    pub academic_year: Option<String>,
    pub search: Option<String>,
}

// 创建班级请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct CreateClassRequest {
    pub name: String,
    pub description: Option<String>,
    pub grade_level: Option<String>,
    // 未提供时由服务层填入配置的默认学年
    pub academic_year: Option<String>,
}

// 更新班级请求，仅更新提供的字段
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub grade_level: Option<String>,
    pub academic_year: Option<String>,
}
