use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{MARK_CODES, MarkService};
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::marks::{entities::MarkDetail, responses::MarkListResponse};
use crate::services::{current_user, error_response};

fn list_response(result: Result<Vec<MarkDetail>>) -> HttpResponse {
    match result {
        Ok(details) => HttpResponse::Ok().json(ApiResponse::success(
            MarkListResponse::from(details),
            "Marks retrieved successfully",
        )),
        Err(e) => error_response(e, MARK_CODES, "Failed to retrieve marks"),
    }
}

pub async fn list_my_marks(service: &MarkService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    Ok(list_response(storage.list_student_marks(user.id).await))
}

pub async fn list_student_marks(
    service: &MarkService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    Ok(list_response(storage.list_student_marks(student_id).await))
}

pub async fn list_class_subject_marks(
    service: &MarkService,
    request: &HttpRequest,
    class_id: i64,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    Ok(list_response(
        storage.list_class_subject_marks(class_id, subject_id).await,
    ))
}
