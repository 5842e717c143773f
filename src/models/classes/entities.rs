use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班级实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub grade_level: Option<String>,
    pub academic_year: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 嵌入在其他响应中的班级摘要
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassSummary {
    pub id: i64,
    pub name: String,
    pub academic_year: String,
}

impl From<&Class> for ClassSummary {
    fn from(class: &Class) -> Self {
        Self {
            id: class.id,
            name: class.name.clone(),
            academic_year: class.academic_year.clone(),
        }
    }
}

// 带在读学生人数的班级
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassWithStudentCount {
    #[serde(flatten)]
    #[ts(flatten)]
    pub class: Class,
    pub student_count: i64,
}
