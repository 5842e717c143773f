use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CLASS_CODES, ClassService};
use crate::models::{ApiResponse, ErrorCode, classes::requests::UpdateClassRequest};
use crate::services::{bad_request, error_response};
use crate::utils::validate::validate_non_blank;

pub async fn update_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    update_data: UpdateClassRequest,
) -> ActixResult<HttpResponse> {
    for (value, field) in [
        (&update_data.name, "name"),
        (&update_data.academic_year, "academic_year"),
    ] {
        if let Some(value) = value
            && let Err(msg) = validate_non_blank(value, field)
        {
            return Ok(bad_request(ErrorCode::ClassUpdateFailed, msg));
        }
    }

    let storage = service.get_storage(request);
    match storage.update_class(class_id, update_data).await {
        Ok(Some(class)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            class,
            "Class information updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e) => Ok(error_response(e, CLASS_CODES, "Class update failed")),
    }
}
