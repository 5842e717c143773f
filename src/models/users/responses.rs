use serde::Serialize;
use ts_rs::TS;

use super::entities::User;
use crate::models::common::PaginationInfo;

/// 单个用户，`password_hash` 不会出现在序列化结果中
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserResponse {
    pub user: User,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self { user }
    }
}

// 用户目录分页结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub pagination: PaginationInfo,
}
