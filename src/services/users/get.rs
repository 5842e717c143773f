use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{USER_CODES, UserService, is_admin_or_self};
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};

pub async fn get_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    if !is_admin_or_self(&current, user_id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You can only view your own profile",
        )));
    }

    let storage = service.get_storage(request);
    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserResponse::from(user),
            "User information retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(error_response(
            e,
            USER_CODES,
            "Failed to get user information",
        )),
    }
}
