use serde::Serialize;
use ts_rs::TS;

use crate::models::users::entities::User;

/// 访问令牌的类型，客户端以 `Authorization: Bearer <token>` 携带
pub const BEARER: &str = "Bearer";

/// 访问令牌及其有效期（秒）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AccessToken {
    pub fn bearer(access_token: String, expiry_minutes: i64) -> Self {
        Self {
            access_token,
            token_type: BEARER.to_string(),
            expires_in: expiry_minutes * 60,
        }
    }
}

// 登录成功：令牌 + 当前用户，刷新令牌走 HttpOnly cookie
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub token: AccessToken,
    pub user: User,
}
