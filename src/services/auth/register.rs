use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use crate::errors::EduPortalError;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::UserRole, requests::CreateUserRequest, responses::UserResponse},
};
use crate::services::bad_request;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_non_blank, validate_password};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    mut create_request: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    create_request.email = create_request.email.trim().to_lowercase();

    if let Err(msg) = validate_email(&create_request.email) {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }
    if let Err(msg) = validate_password(&create_request.password) {
        return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
    }
    if let Err(msg) = validate_non_blank(&create_request.full_name, "full_name") {
        return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
    }

    // 管理员账号只能在系统尚无管理员时自助注册
    if create_request.role == UserRole::Admin {
        match storage.count_users_by_role(UserRole::Admin).await {
            Ok(0) => {}
            Ok(_) => {
                return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                    ErrorCode::AdminAlreadyExists,
                    "An administrator already exists",
                )));
            }
            Err(e) => {
                error!("注册时统计管理员失败: {}", e);
                return Ok(register_failed(&e));
            }
        }
    }

    create_request.password = match hash_password(&create_request.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("密码哈希失败: {}", e);
            return Ok(register_failed(&e));
        }
    };

    match storage.create_user(create_request).await {
        Ok(user) => {
            info!("New {} registered: {}", user.role, user.email);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                UserResponse::from(user),
                "Registration successful",
            )))
        }
        Err(EduPortalError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::UserEmailAlreadyExists, msg),
        )),
        Err(e) => {
            error!("注册失败: {}", e);
            Ok(register_failed(&e))
        }
    }
}

fn register_failed(err: &EduPortalError) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::RegisterFailed,
        format!("Registration failed: {}", err.message()),
    ))
}
