use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ENROLLMENT_CODES, EnrollmentService};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{DomainCodes, error_response};

// 退课时的 NotFound 指选课记录本身
const UNENROLL_CODES: DomainCodes = DomainCodes {
    not_found: ErrorCode::EnrollmentNotFound,
    ..ENROLLMENT_CODES
};

pub async fn unenroll(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.unenroll_student(enrollment_id).await {
        Ok(()) => {
            info!("Enrollment {} removed", enrollment_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Student unenrolled successfully",
            )))
        }
        Err(e) => Ok(error_response(e, UNENROLL_CODES, "Unenrollment failed")),
    }
}

pub async fn unenroll_from_class(
    service: &EnrollmentService,
    request: &HttpRequest,
    student_id: i64,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .unenroll_student_from_class(student_id, class_id)
        .await
    {
        Ok(()) => {
            info!("Student {} removed from class {}", student_id, class_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Student unenrolled successfully",
            )))
        }
        Err(e) => Ok(error_response(e, UNENROLL_CODES, "Unenrollment failed")),
    }
}
