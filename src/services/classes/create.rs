use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CLASS_CODES, ClassService};
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::classes::requests::CreateClassRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, error_response};
use crate::utils::validate::validate_non_blank;

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    mut class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_non_blank(&class_data.name, "name") {
        return Ok(bad_request(ErrorCode::ClassCreationFailed, msg));
    }
    class_data.name = class_data.name.trim().to_string();

    // 未指定学年时使用配置的默认学年
    let academic_year = match class_data.academic_year.take() {
        Some(year) if !year.trim().is_empty() => year.trim().to_string(),
        _ => AppConfig::get().school.default_academic_year.clone(),
    };
    class_data.academic_year = Some(academic_year);

    let storage = service.get_storage(request);
    match storage.create_class(class_data).await {
        Ok(class) => {
            info!(
                "Class {} ({}) created by {:?}",
                class.name,
                class.academic_year,
                RequireJWT::extract_user_id(request)
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(class, "Class created successfully")))
        }
        Err(e) => Ok(error_response(e, CLASS_CODES, "Class creation failed")),
    }
}
