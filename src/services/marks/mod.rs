pub mod average;
pub mod grade;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::ErrorCode;
use crate::models::marks::requests::{AddMarkRequest, UpdateMarkRequest};
use crate::services::DomainCodes;
use crate::utils::validate::{validate_max_score, validate_non_blank, validate_score};

super::storage_backed_service!(MarkService);

pub(crate) const MARK_CODES: DomainCodes = DomainCodes {
    not_found: ErrorCode::NotFound,
    conflict: ErrorCode::Conflict,
    invalid: ErrorCode::MarkInvalid,
};

/// 成绩请求的字段校验：考试类型非空，分数可存入两位小数列，满分非零
pub(crate) fn validate_mark_fields(
    exam_type: &str,
    score: f64,
    max_score: Option<f64>,
) -> Result<(), String> {
    validate_non_blank(exam_type, "exam_type")?;
    validate_score(score).map_err(str::to_string)?;
    validate_max_score(max_score).map_err(str::to_string)
}

impl MarkService {
    pub async fn add_mark(
        &self,
        request: &HttpRequest,
        mark_data: AddMarkRequest,
    ) -> ActixResult<HttpResponse> {
        grade::add_mark(self, request, mark_data).await
    }

    // 批量录入，逐条提交
    pub async fn add_marks_bulk(
        &self,
        request: &HttpRequest,
        marks: Vec<AddMarkRequest>,
    ) -> ActixResult<HttpResponse> {
        grade::add_marks_bulk(self, request, marks).await
    }

    pub async fn update_mark(
        &self,
        request: &HttpRequest,
        mark_id: i64,
        update_data: UpdateMarkRequest,
    ) -> ActixResult<HttpResponse> {
        grade::update_mark(self, request, mark_id, update_data).await
    }

    pub async fn delete_mark(
        &self,
        request: &HttpRequest,
        mark_id: i64,
    ) -> ActixResult<HttpResponse> {
        grade::delete_mark(self, request, mark_id).await
    }

    pub async fn list_my_marks(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_my_marks(self, request).await
    }

    pub async fn list_student_marks(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_student_marks(self, request, student_id).await
    }

    pub async fn list_class_subject_marks(
        &self,
        request: &HttpRequest,
        class_id: i64,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_class_subject_marks(self, request, class_id, subject_id).await
    }

    pub async fn get_my_average(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        average::get_my_average(self, request).await
    }

    pub async fn get_student_average(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        average::get_student_average(self, request, student_id).await
    }

    pub async fn get_class_subject_average(
        &self,
        request: &HttpRequest,
        class_id: i64,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        average::get_class_subject_average(self, request, class_id, subject_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mark_fields() {
        assert!(validate_mark_fields("Unit Test", 42.0, Some(50.0)).is_ok());
        assert!(validate_mark_fields("Final", 120.0, None).is_ok());
        assert!(validate_mark_fields("  ", 42.0, None).is_err());
        assert!(validate_mark_fields("Final", f64::NAN, None).is_err());
        assert!(validate_mark_fields("Final", 10.0, Some(0.0)).is_err());
        assert!(validate_mark_fields("Final", 10.0, Some(0.001)).is_err());
        assert!(validate_mark_fields("Final", 1e12, None).is_err());
    }
}
