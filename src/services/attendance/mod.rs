pub mod mark;
pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;

use crate::models::ErrorCode;
use crate::models::attendance::requests::{ClassAttendanceRequest, MarkAttendanceRequest};
use crate::services::DomainCodes;

super::storage_backed_service!(AttendanceService);

pub(crate) const ATTENDANCE_CODES: DomainCodes = DomainCodes {
    not_found: ErrorCode::NotFound,
    conflict: ErrorCode::Conflict,
    invalid: ErrorCode::AttendanceInvalid,
};

impl AttendanceService {
    // 单条考勤（按学生、班级、日期覆盖）
    pub async fn mark_attendance(
        &self,
        request: &HttpRequest,
        mark_data: MarkAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        mark::mark_attendance(self, request, mark_data).await
    }

    // 批量考勤，整批原子
    pub async fn mark_attendance_bulk(
        &self,
        request: &HttpRequest,
        records: Vec<MarkAttendanceRequest>,
    ) -> ActixResult<HttpResponse> {
        mark::mark_attendance_bulk(self, request, records).await
    }

    // 班级某日批量考勤
    pub async fn mark_class_attendance(
        &self,
        request: &HttpRequest,
        class_data: ClassAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        mark::mark_class_attendance(self, request, class_data).await
    }

    pub async fn delete_attendance(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
    ) -> ActixResult<HttpResponse> {
        mark::delete_attendance(self, request, attendance_id).await
    }

    pub async fn list_my_attendance(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::list_my_attendance(self, request).await
    }

    pub async fn list_student_attendance(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        query::list_student_attendance(self, request, student_id).await
    }

    pub async fn list_class_attendance(
        &self,
        request: &HttpRequest,
        class_id: i64,
        date: NaiveDate,
    ) -> ActixResult<HttpResponse> {
        query::list_class_attendance(self, request, class_id, date).await
    }

    pub async fn get_my_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::get_my_stats(self, request).await
    }

    pub async fn get_student_stats(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        query::get_student_stats(self, request, student_id).await
    }
}
