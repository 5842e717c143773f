use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{USER_CODES, UserService, is_admin_or_self};
use crate::models::{
    ApiResponse, ErrorCode,
    users::{requests::UpdateUserRequest, responses::UserResponse},
};
use crate::services::{bad_request, current_user, error_response};
use crate::utils::validate::validate_non_blank;

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    if !is_admin_or_self(&current, user_id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You can only update your own profile",
        )));
    }

    if let Some(ref full_name) = update_data.full_name
        && let Err(msg) = validate_non_blank(full_name, "full_name")
    {
        return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
    }

    let storage = service.get_storage(request);
    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserResponse::from(user),
            "User information updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(error_response(
            e,
            USER_CODES,
            "Failed to update user information",
        )),
    }
}
