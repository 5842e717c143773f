use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{EduPortalError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::MAX_PAGE_SIZE,
    users::{
        entities::{User, UserRole},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

use super::lookups::{find_user, is_unique_violation};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();
        let email = req.email.clone();

        let model = ActiveModel {
            email: Set(req.email),
            password_hash: Set(req.password),
            full_name: Set(req.full_name),
            phone: Set(req.phone),
            role: Set(req.role.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduPortalError::conflict(format!("Email is already in use: {email}"))
            } else {
                EduPortalError::database_operation(format!("创建用户失败: {e}"))
            }
        })?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        find_user(&self.db, id).await
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, MAX_PAGE_SIZE) as u64;

        let mut select = Users::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Email.contains(&escaped))
                    .add(Column::FullName.contains(&escaped)),
            );
        }

        // 角色筛选
        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        // 排序
        select = select.order_by_asc(Column::FullName);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询用户总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询用户页数失败: {e}")))?;

        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 更新用户信息（姓名、电话）
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        // 先检查用户是否存在
        let existing = self.get_user_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(full_name) = update.full_name {
            model.full_name = Set(full_name);
        }

        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("更新用户失败: {e}")))?;

        self.get_user_by_id_impl(id).await
    }

    /// 切换用户启用状态
    pub async fn toggle_user_status_impl(&self, id: i64) -> Result<Option<User>> {
        let Some(user) = self.get_user_by_id_impl(id).await? else {
            return Ok(None);
        };

        let model = ActiveModel {
            id: Set(id),
            is_active: Set(!user.is_active),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        model
            .update(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("更新用户状态失败: {e}")))?;

        self.get_user_by_id_impl(id).await
    }

    /// 删除用户
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("删除用户失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }

    /// 按角色统计用户数量
    pub async fn count_users_by_role_impl(&self, role: UserRole) -> Result<u64> {
        let count = Users::find()
            .filter(Column::Role.eq(role.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_user, memory_storage};
    use crate::models::users::{
        entities::UserRole,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
    };

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let storage = memory_storage().await;
        create_user(&storage, "a@school.test", UserRole::Student).await;

        let err = storage
            .create_user_impl(CreateUserRequest {
                email: "a@school.test".into(),
                password: "hash".into(),
                full_name: "Other".into(),
                phone: None,
                role: UserRole::Teacher,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn test_update_only_supplied_fields() {
        let storage = memory_storage().await;
        let user = create_user(&storage, "b@school.test", UserRole::Student).await;

        let updated = storage
            .update_user_impl(
                user.id,
                UpdateUserRequest {
                    full_name: None,
                    phone: Some("555-0100".into()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name, user.full_name);
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));

        assert!(
            storage
                .update_user_impl(9999, UpdateUserRequest::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_toggle_status_and_role_filters() {
        let storage = memory_storage().await;
        let student = create_user(&storage, "c@school.test", UserRole::Student).await;
        create_user(&storage, "d@school.test", UserRole::Teacher).await;

        let toggled = storage
            .toggle_user_status_impl(student.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!toggled.is_active);

        assert_eq!(
            storage
                .count_users_by_role_impl(UserRole::Teacher)
                .await
                .unwrap(),
            1
        );

        let students = storage
            .list_users_with_pagination_impl(UserListQuery {
                role: Some(UserRole::Student),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(students.pagination.total, 1);
        assert_eq!(students.items[0].id, student.id);
    }
}
