use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{MARK_CODES, MarkService};
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::marks::responses::AverageResponse;
use crate::services::{current_user, error_response};

fn average_response(
    result: Result<Option<f64>>,
    student_id: Option<i64>,
    class_id: Option<i64>,
    subject_id: Option<i64>,
) -> HttpResponse {
    match result {
        Ok(average) => HttpResponse::Ok().json(ApiResponse::success(
            AverageResponse {
                student_id,
                class_id,
                subject_id,
                average,
            },
            "Average retrieved successfully",
        )),
        Err(e) => error_response(e, MARK_CODES, "Failed to compute average"),
    }
}

pub async fn get_my_average(
    service: &MarkService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    let result = storage.get_student_average(user.id).await;
    Ok(average_response(result, Some(user.id), None, None))
}

pub async fn get_student_average(
    service: &MarkService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let result = storage.get_student_average(student_id).await;
    Ok(average_response(result, Some(student_id), None, None))
}

pub async fn get_class_subject_average(
    service: &MarkService,
    request: &HttpRequest,
    class_id: i64,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let result = storage.get_class_subject_average(class_id, subject_id).await;
    Ok(average_response(result, None, Some(class_id), Some(subject_id)))
}
