use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{USER_CODES, UserService};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, error_response};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(bad_request(
            ErrorCode::UserDeleteFailed,
            "Cannot delete current user",
        ));
    }

    let storage = service.get_storage(request);
    match storage.delete_user(user_id).await {
        Ok(true) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(error_response(e, USER_CODES, "User deletion failed")),
    }
}
