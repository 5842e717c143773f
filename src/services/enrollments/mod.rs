pub mod enroll;
pub mod list;
pub mod unenroll;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::ErrorCode;
use crate::models::enrollments::requests::EnrollStudentRequest;
use crate::services::DomainCodes;

super::storage_backed_service!(EnrollmentService);

// 角色不符（非学生）同样按 400 返回
pub(crate) const ENROLLMENT_CODES: DomainCodes = DomainCodes {
    not_found: ErrorCode::NotFound,
    conflict: ErrorCode::EnrollmentAlreadyExists,
    invalid: ErrorCode::BadRequest,
};

impl EnrollmentService {
    pub async fn enroll_student(
        &self,
        request: &HttpRequest,
        enroll_data: EnrollStudentRequest,
    ) -> ActixResult<HttpResponse> {
        enroll::enroll_student(self, request, enroll_data).await
    }

    pub async fn unenroll(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        unenroll::unenroll(self, request, enrollment_id).await
    }

    pub async fn unenroll_from_class(
        &self,
        request: &HttpRequest,
        student_id: i64,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        unenroll::unenroll_from_class(self, request, student_id, class_id).await
    }

    // 当前学生的班级
    pub async fn list_my_classes(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_my_classes(self, request).await
    }

    pub async fn list_by_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_by_student(self, request, student_id).await
    }

    pub async fn list_by_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_by_class(self, request, class_id).await
    }
}
