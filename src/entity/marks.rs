//! 成绩实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "marks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub exam_type: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub score: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub max_score: Decimal,
    pub exam_date: Date,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub graded_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::GradedBy",
        to = "super::users::Column::Id"
    )]
    GradedBy,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_mark(self) -> crate::models::marks::entities::MarkRecord {
        use crate::models::marks::entities::MarkRecord;
        use crate::utils::decimal::round_half_up;
        use chrono::{DateTime, Utc};

        MarkRecord {
            id: self.id,
            student_id: self.student_id,
            class_id: self.class_id,
            subject_id: self.subject_id,
            exam_type: self.exam_type,
            // SQLite 以浮点读回 DECIMAL 列，统一回到两位小数
            score: round_half_up(self.score, 2),
            max_score: round_half_up(self.max_score, 2),
            exam_date: self.exam_date,
            notes: self.notes,
            graded_by: self.graded_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
