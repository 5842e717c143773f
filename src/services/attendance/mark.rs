use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ATTENDANCE_CODES, AttendanceService};
use crate::models::attendance::{
    requests::{ClassAttendanceRequest, MarkAttendanceRequest},
    responses::{AttendanceListResponse, AttendanceResponse},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{DomainCodes, current_user, error_response};

pub async fn mark_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    mark_data: MarkAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request);

    match storage.mark_attendance(mark_data, user.id).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AttendanceResponse::from(detail),
            "Attendance marked successfully",
        ))),
        Err(e) => Ok(error_response(e, ATTENDANCE_CODES, "Failed to mark attendance")),
    }
}

pub async fn mark_attendance_bulk(
    service: &AttendanceService,
    request: &HttpRequest,
    records: Vec<MarkAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let count = records.len();
    let storage = service.get_storage(request);
    match storage.mark_attendance_batch(records, user.id).await {
        Ok(details) => {
            info!("{} attendance records marked by user {}", count, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AttendanceListResponse::from(details),
                "Attendance marked successfully",
            )))
        }
        Err(e) => Ok(error_response(e, ATTENDANCE_CODES, "Bulk attendance failed")),
    }
}

pub async fn mark_class_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    class_data: ClassAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let class_id = class_data.class_id;
    let date = class_data.date;
    let storage = service.get_storage(request);
    match storage.mark_class_attendance(class_data, user.id).await {
        Ok(details) => {
            info!(
                "Class {} attendance for {} marked by user {} ({} records)",
                class_id,
                date,
                user.id,
                details.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AttendanceListResponse::from(details),
                "Class attendance marked successfully",
            )))
        }
        Err(e) => Ok(error_response(
            e,
            ATTENDANCE_CODES,
            "Class attendance failed",
        )),
    }
}

pub async fn delete_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_attendance(attendance_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Attendance record deleted successfully",
        ))),
        Err(e) => Ok(error_response(
            e,
            DomainCodes {
                not_found: ErrorCode::AttendanceNotFound,
                ..ATTENDANCE_CODES
            },
            "Failed to delete attendance record",
        )),
    }
}
