use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{USER_CODES, UserService};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, users::responses::UserResponse};
use crate::services::{bad_request, error_response};

pub async fn toggle_user_status(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 禁止停用自己，避免管理员把自己锁在门外
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(bad_request(
            ErrorCode::UserUpdateFailed,
            "Cannot change the status of the current user",
        ));
    }

    let storage = service.get_storage(request);
    match storage.toggle_user_status(user_id).await {
        Ok(Some(user)) => {
            info!("User {} active flag set to {}", user.id, user.is_active);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse::from(user),
                "User status updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(error_response(e, USER_CODES, "Failed to update user status")),
    }
}
