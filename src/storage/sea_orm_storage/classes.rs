//! 班级存储操作

use super::SeaOrmStorage;
use super::lookups::{count_enrolled, is_unique_violation};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::errors::{EduPortalError, Result};
use crate::models::classes::{
    entities::{Class, ClassWithStudentCount},
    requests::{ClassQueryParams, CreateClassRequest, UpdateClassRequest},
    responses::ClassListResponse,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_class_impl(&self, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        // academic_year 必须由服务层确保已设置
        let academic_year = req.academic_year.ok_or_else(|| {
            EduPortalError::validation("academic_year must be set before calling create_class")
        })?;
        let name = req.name.clone();

        let model = ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            grade_level: Set(req.grade_level),
            academic_year: Set(academic_year.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduPortalError::conflict(format!(
                    "Class '{name}' already exists for academic year {academic_year}"
                ))
            } else {
                EduPortalError::database_operation(format!("创建班级失败: {e}"))
            }
        })?;

        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 列出班级，按名称排序并附带在读学生数
    pub async fn list_classes_impl(&self, query: ClassQueryParams) -> Result<ClassListResponse> {
        let mut select = Classes::find();

        if let Some(ref year) = query.academic_year
            && !year.trim().is_empty()
        {
            select = select.filter(Column::AcademicYear.eq(year.trim()));
        }

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Name.contains(&escaped));
        }

        let classes = select
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询班级列表失败: {e}")))?;

        let class_ids: Vec<i64> = classes.iter().map(|c| c.id).collect();
        let counts = count_enrolled(&self.db, &class_ids).await?;

        Ok(ClassListResponse {
            items: classes
                .into_iter()
                .map(|m| {
                    let student_count = counts.get(&m.id).copied().unwrap_or(0);
                    ClassWithStudentCount {
                        class: m.into_class(),
                        student_count,
                    }
                })
                .collect(),
        })
    }

    /// 更新班级信息，仅覆盖提供的字段
    pub async fn update_class_impl(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        // 先检查班级是否存在
        let existing = self.get_class_by_id_impl(class_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(class_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(grade_level) = update.grade_level {
            model.grade_level = Set(Some(grade_level));
        }

        if let Some(academic_year) = update.academic_year {
            model.academic_year = Set(academic_year);
        }

        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduPortalError::conflict("A class with this name already exists for that academic year")
            } else {
                EduPortalError::database_operation(format!("更新班级失败: {e}"))
            }
        })?;

        self.get_class_by_id_impl(class_id).await
    }

    /// 删除班级
    pub async fn delete_class_impl(&self, class_id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(class_id)
            .exec(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("删除班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计班级数量
    pub async fn count_classes_impl(&self) -> Result<u64> {
        Classes::find()
            .count(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("统计班级数量失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_class, create_user, memory_storage};
    use crate::models::classes::requests::{ClassQueryParams, CreateClassRequest};
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_duplicate_name_and_year_is_conflict() {
        let storage = memory_storage().await;
        create_class(&storage, "5A").await;

        let err = storage
            .create_class_impl(CreateClassRequest {
                name: "5A".into(),
                description: None,
                grade_level: None,
                academic_year: Some("2024-2025".into()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");

        // 同名不同学年允许
        let other_year = storage
            .create_class_impl(CreateClassRequest {
                name: "5A".into(),
                description: None,
                grade_level: None,
                academic_year: Some("2025-2026".into()),
            })
            .await
            .unwrap();
        assert_eq!(other_year.academic_year, "2025-2026");
    }

    #[tokio::test]
    async fn test_list_sorted_by_name_with_counts() {
        let storage = memory_storage().await;
        let b = create_class(&storage, "6B").await;
        create_class(&storage, "5A").await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        storage.enroll_student_impl(student.id, b.id).await.unwrap();

        let list = storage
            .list_classes_impl(ClassQueryParams::default())
            .await
            .unwrap();
        let names: Vec<_> = list.items.iter().map(|c| c.class.name.as_str()).collect();
        assert_eq!(names, vec!["5A", "6B"]);
        assert_eq!(list.items[0].student_count, 0);
        assert_eq!(list.items[1].student_count, 1);
    }
}
