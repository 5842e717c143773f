use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;

use super::{ATTENDANCE_CODES, AttendanceService};
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::attendance::{
    entities::{AttendanceDetail, AttendanceStats},
    responses::AttendanceListResponse,
};
use crate::services::{current_user, error_response};

fn list_response(result: Result<Vec<AttendanceDetail>>) -> HttpResponse {
    match result {
        Ok(details) => HttpResponse::Ok().json(ApiResponse::success(
            AttendanceListResponse::from(details),
            "Attendance records retrieved successfully",
        )),
        Err(e) => error_response(e, ATTENDANCE_CODES, "Failed to retrieve attendance records"),
    }
}

fn stats_response(result: Result<AttendanceStats>) -> HttpResponse {
    match result {
        Ok(stats) => HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "Attendance statistics retrieved successfully",
        )),
        Err(e) => error_response(e, ATTENDANCE_CODES, "Failed to compute attendance statistics"),
    }
}

pub async fn list_my_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    Ok(list_response(storage.list_student_attendance(user.id).await))
}

pub async fn list_student_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    Ok(list_response(
        storage.list_student_attendance(student_id).await,
    ))
}

pub async fn list_class_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    class_id: i64,
    date: NaiveDate,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    Ok(list_response(
        storage.list_class_attendance(class_id, date).await,
    ))
}

pub async fn get_my_stats(
    service: &AttendanceService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);
    Ok(stats_response(
        storage.get_student_attendance_stats(user.id).await,
    ))
}

pub async fn get_student_stats(
    service: &AttendanceService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    Ok(stats_response(
        storage.get_student_attendance_stats(student_id).await,
    ))
}
