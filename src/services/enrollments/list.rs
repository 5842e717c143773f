use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ENROLLMENT_CODES, EnrollmentService};
use crate::errors::Result;
use crate::models::enrollments::{entities::EnrollmentDetail, responses::EnrollmentListResponse};
use crate::models::ApiResponse;
use crate::services::{current_user, error_response};

fn list_response(result: Result<Vec<EnrollmentDetail>>) -> HttpResponse {
    match result {
        Ok(details) => HttpResponse::Ok().json(ApiResponse::success(
            EnrollmentListResponse::from(details),
            "Enrollments retrieved successfully",
        )),
        Err(e) => error_response(e, ENROLLMENT_CODES, "Failed to retrieve enrollments"),
    }
}

pub async fn list_my_classes(
    service: &EnrollmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    Ok(list_response(
        storage.list_enrollments_by_student(user.id).await,
    ))
}

pub async fn list_by_student(
    service: &EnrollmentService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    Ok(list_response(
        storage.list_enrollments_by_student(student_id).await,
    ))
}

pub async fn list_by_class(
    service: &EnrollmentService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    Ok(list_response(storage.list_enrollments_by_class(class_id).await))
}
