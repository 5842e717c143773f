//! 科目存储操作

use super::SeaOrmStorage;
use super::lookups::is_unique_violation;
use crate::entity::subjects::{ActiveModel, Column, Entity as Subjects};
use crate::errors::{EduPortalError, Result};
use crate::models::subjects::{
    entities::Subject,
    requests::{CreateSubjectRequest, UpdateSubjectRequest},
};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建科目，科目代码唯一
    pub async fn create_subject_impl(&self, req: CreateSubjectRequest) -> Result<Subject> {
        let now = chrono::Utc::now().timestamp();
        let code = req.code.clone();

        let model = ActiveModel {
            name: Set(req.name),
            code: Set(req.code),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduPortalError::conflict(format!(
                    "Subject code is already in use: {}",
                    code.unwrap_or_default()
                ))
            } else {
                EduPortalError::database_operation(format!("创建科目失败: {e}"))
            }
        })?;

        Ok(result.into_subject())
    }

    pub async fn get_subject_by_id_impl(&self, subject_id: i64) -> Result<Option<Subject>> {
        let result = Subjects::find_by_id(subject_id)
            .one(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询科目失败: {e}")))?;

        Ok(result.map(|m| m.into_subject()))
    }

    /// 列出全部科目，按名称排序
    pub async fn list_subjects_impl(&self) -> Result<Vec<Subject>> {
        let subjects = Subjects::find()
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询科目列表失败: {e}")))?;

        Ok(subjects.into_iter().map(|m| m.into_subject()).collect())
    }

    pub async fn update_subject_impl(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        if self.get_subject_by_id_impl(subject_id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(subject_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(code) = update.code {
            model.code = Set(Some(code));
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduPortalError::conflict("Subject code is already in use")
            } else {
                EduPortalError::database_operation(format!("更新科目失败: {e}"))
            }
        })?;

        self.get_subject_by_id_impl(subject_id).await
    }

    pub async fn delete_subject_impl(&self, subject_id: i64) -> Result<bool> {
        let result = Subjects::delete_by_id(subject_id)
            .exec(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("删除科目失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_subjects_impl(&self) -> Result<u64> {
        Subjects::find()
            .count(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("统计科目数量失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::memory_storage;
    use crate::models::subjects::requests::{CreateSubjectRequest, UpdateSubjectRequest};

    fn subject(name: &str, code: Option<&str>) -> CreateSubjectRequest {
        CreateSubjectRequest {
            name: name.to_string(),
            code: code.map(str::to_string),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict() {
        let storage = memory_storage().await;
        storage
            .create_subject_impl(subject("Mathematics", Some("MATH")))
            .await
            .unwrap();

        let err = storage
            .create_subject_impl(subject("Applied Mathematics", Some("MATH")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");

        // 无代码的科目互不冲突
        storage.create_subject_impl(subject("Art", None)).await.unwrap();
        storage.create_subject_impl(subject("Music", None)).await.unwrap();
        assert_eq!(storage.list_subjects_impl().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let storage = memory_storage().await;
        let created = storage
            .create_subject_impl(subject("Physics", None))
            .await
            .unwrap();

        let updated = storage
            .update_subject_impl(
                created.id,
                UpdateSubjectRequest {
                    code: Some("PHY".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Physics");
        assert_eq!(updated.code.as_deref(), Some("PHY"));

        assert!(
            storage
                .update_subject_impl(9999, UpdateSubjectRequest::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(storage.delete_subject_impl(created.id).await.unwrap());
        assert!(!storage.delete_subject_impl(created.id).await.unwrap());
    }
}
