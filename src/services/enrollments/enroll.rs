use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ENROLLMENT_CODES, EnrollmentService};
use crate::models::{
    ApiResponse,
    enrollments::{requests::EnrollStudentRequest, responses::EnrollmentResponse},
};
use crate::services::error_response;

pub async fn enroll_student(
    service: &EnrollmentService,
    request: &HttpRequest,
    enroll_data: EnrollStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .enroll_student(enroll_data.student_id, enroll_data.class_id)
        .await
    {
        Ok(detail) => {
            info!(
                "Student {} enrolled in class {}",
                detail.student.id, detail.class.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                EnrollmentResponse::from(detail),
                "Student enrolled successfully",
            )))
        }
        Err(e) => Ok(error_response(e, ENROLLMENT_CODES, "Enrollment failed")),
    }
}
