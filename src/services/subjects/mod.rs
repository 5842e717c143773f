use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::models::subjects::{
    requests::{CreateSubjectRequest, UpdateSubjectRequest},
    responses::SubjectListResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{DomainCodes, bad_request, error_response};
use crate::utils::validate::validate_non_blank;

super::storage_backed_service!(SubjectService);

const SUBJECT_CODES: DomainCodes = DomainCodes {
    not_found: ErrorCode::SubjectNotFound,
    conflict: ErrorCode::SubjectAlreadyExists,
    invalid: ErrorCode::BadRequest,
};

/// 空白编码视为未提供
fn normalize_code(code: Option<String>) -> Option<String> {
    code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

impl SubjectService {
    pub async fn list_subjects(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        match storage.list_subjects().await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                SubjectListResponse { items },
                "Subject list retrieved successfully",
            ))),
            Err(e) => Ok(error_response(
                e,
                SUBJECT_CODES,
                "Failed to retrieve subject list",
            )),
        }
    }

    pub async fn get_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        match storage.get_subject_by_id(subject_id).await {
            Ok(Some(subject)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                subject,
                "Subject retrieved successfully",
            ))),
            Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubjectNotFound,
                "Subject not found",
            ))),
            Err(e) => Ok(error_response(e, SUBJECT_CODES, "Failed to retrieve subject")),
        }
    }

    pub async fn create_subject(
        &self,
        request: &HttpRequest,
        mut subject_data: CreateSubjectRequest,
    ) -> ActixResult<HttpResponse> {
        if let Err(msg) = validate_non_blank(&subject_data.name, "name") {
            return Ok(bad_request(ErrorCode::SubjectCreationFailed, msg));
        }
        subject_data.name = subject_data.name.trim().to_string();
        subject_data.code = normalize_code(subject_data.code);

        let storage = self.get_storage(request);
        match storage.create_subject(subject_data).await {
            Ok(subject) => {
                info!("Subject {} created", subject.name);
                Ok(HttpResponse::Created()
                    .json(ApiResponse::success(subject, "Subject created successfully")))
            }
            Err(e) => Ok(error_response(e, SUBJECT_CODES, "Subject creation failed")),
        }
    }

    pub async fn update_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
        mut update_data: UpdateSubjectRequest,
    ) -> ActixResult<HttpResponse> {
        if let Some(ref name) = update_data.name
            && let Err(msg) = validate_non_blank(name, "name")
        {
            return Ok(bad_request(ErrorCode::SubjectUpdateFailed, msg));
        }
        update_data.code = normalize_code(update_data.code);

        let storage = self.get_storage(request);
        match storage.update_subject(subject_id, update_data).await {
            Ok(Some(subject)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                subject,
                "Subject updated successfully",
            ))),
            Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubjectNotFound,
                "Subject not found",
            ))),
            Err(e) => Ok(error_response(e, SUBJECT_CODES, "Subject update failed")),
        }
    }

    pub async fn delete_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        match storage.delete_subject(subject_id).await {
            Ok(true) => Ok(
                HttpResponse::Ok().json(ApiResponse::success_empty("Subject deleted successfully"))
            ),
            Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubjectNotFound,
                "Subject not found",
            ))),
            Err(e) => Ok(error_response(e, SUBJECT_CODES, "Subject deletion failed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(Some(" MATH ".into())), Some("MATH".into()));
        assert_eq!(normalize_code(Some("   ".into())), None);
        assert_eq!(normalize_code(None), None);
    }
}
