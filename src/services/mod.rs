pub mod attendance;
pub mod auth;
pub mod classes;
pub mod dashboard;
pub mod enrollments;
pub mod marks;
pub mod subjects;
pub mod teaching_assignments;
pub mod users;

pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use classes::ClassService;
pub use dashboard::DashboardService;
pub use enrollments::EnrollmentService;
pub use marks::MarkService;
pub use subjects::SubjectService;
pub use teaching_assignments::TeachingAssignmentService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse};
use tracing::error;

use crate::errors::EduPortalError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 各业务域在 NotFound / Conflict / Validation 时使用的业务码
#[derive(Debug, Clone, Copy)]
pub(crate) struct DomainCodes {
    pub not_found: ErrorCode,
    pub conflict: ErrorCode,
    pub invalid: ErrorCode,
}

impl DomainCodes {
    pub(crate) const GENERIC: DomainCodes = DomainCodes {
        not_found: ErrorCode::NotFound,
        conflict: ErrorCode::Conflict,
        invalid: ErrorCode::BadRequest,
    };
}

/// 将存储层错误映射为 HTTP 响应
///
/// Validation -> 400，NotFound -> 404，Conflict -> 409，其余 -> 500。
pub(crate) fn error_response(err: EduPortalError, codes: DomainCodes, context: &str) -> HttpResponse {
    match err {
        EduPortalError::Validation(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(codes.invalid, msg))
        }
        EduPortalError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(codes.not_found, msg))
        }
        EduPortalError::Conflict(msg) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(codes.conflict, msg))
        }
        other => {
            error!("{}: {}", context, other);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("{context}: {}", other.message()),
            ))
        }
    }
}

/// 400 校验失败响应
pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

/// 取当前认证用户，缺失时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))
    })
}

/// 从 app_data 取存储实例的服务样板
macro_rules! storage_backed_service {
    ($name:ident) => {
        pub struct $name {
            storage: Option<std::sync::Arc<dyn crate::storage::Storage>>,
        }

        impl $name {
            pub fn new_lazy() -> Self {
                Self { storage: None }
            }

            pub(crate) fn get_storage(
                &self,
                request: &actix_web::HttpRequest,
            ) -> std::sync::Arc<dyn crate::storage::Storage> {
                if let Some(storage) = &self.storage {
                    storage.clone()
                } else {
                    request
                        .app_data::<actix_web::web::Data<std::sync::Arc<dyn crate::storage::Storage>>>()
                        .expect("Storage not found in app data")
                        .get_ref()
                        .clone()
                }
            }
        }
    };
}

pub(crate) use storage_backed_service;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_mapping() {
        let cases = [
            (EduPortalError::validation("wrong role"), StatusCode::BAD_REQUEST),
            (EduPortalError::not_found("no class"), StatusCode::NOT_FOUND),
            (EduPortalError::conflict("duplicate"), StatusCode::CONFLICT),
            (
                EduPortalError::database_operation("disk full"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(
                error_response(err, DomainCodes::GENERIC, "test").status(),
                status
            );
        }
    }
}
