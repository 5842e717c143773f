pub mod delete;
pub mod get;
pub mod list;
pub mod toggle_status;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::ErrorCode;
use crate::models::users::{
    entities::{User, UserRole},
    requests::{UpdateUserRequest, UserListParams},
};
use crate::services::DomainCodes;

super::storage_backed_service!(UserService);

pub(crate) const USER_CODES: DomainCodes = DomainCodes {
    not_found: ErrorCode::UserNotFound,
    conflict: ErrorCode::UserEmailAlreadyExists,
    invalid: ErrorCode::BadRequest,
};

/// 管理员或本人
pub(crate) fn is_admin_or_self(current: &User, user_id: i64) -> bool {
    current.role == UserRole::Admin || current.id == user_id
}

impl UserService {
    // 获取用户列表
    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_users(self, query, None, request).await
    }

    // 按角色获取用户列表（学生、教师）
    pub async fn list_users_by_role(
        &self,
        query: UserListParams,
        role: UserRole,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_users(self, query, Some(role), request).await
    }

    // 根据ID获取用户
    pub async fn get_user(&self, user_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_user(self, user_id, request).await
    }

    // 更新用户信息
    pub async fn update_user(
        &self,
        user_id: i64,
        update_data: UpdateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_user(self, user_id, update_data, request).await
    }

    // 切换启用状态
    pub async fn toggle_user_status(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        toggle_status::toggle_user_status(self, user_id, request).await
    }

    // 删除用户
    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_user(self, user_id, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            email: format!("u{id}@school.test"),
            password_hash: String::new(),
            full_name: format!("User {id}"),
            phone: None,
            role,
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_admin_or_self() {
        assert!(is_admin_or_self(&user(1, UserRole::Admin), 2));
        assert!(is_admin_or_self(&user(2, UserRole::Student), 2));
        assert!(!is_admin_or_self(&user(3, UserRole::Teacher), 2));
    }
}
