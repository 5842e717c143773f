use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::{MARK_CODES, MarkService, validate_mark_fields};
use crate::models::marks::{
    requests::{AddMarkRequest, UpdateMarkRequest},
    responses::{MarkListResponse, MarkResponse},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{DomainCodes, bad_request, current_user, error_response};

const MARK_RECORD_CODES: DomainCodes = DomainCodes {
    not_found: ErrorCode::MarkNotFound,
    ..MARK_CODES
};

pub async fn add_mark(
    service: &MarkService,
    request: &HttpRequest,
    mark_data: AddMarkRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    if let Err(msg) =
        validate_mark_fields(&mark_data.exam_type, mark_data.score, mark_data.max_score)
    {
        return Ok(bad_request(ErrorCode::MarkInvalid, msg));
    }

    let storage = service.get_storage(request);
    match storage.add_mark(mark_data, user.id).await {
        Ok(detail) => Ok(HttpResponse::Created().json(ApiResponse::success(
            MarkResponse::from(detail),
            "Mark added successfully",
        ))),
        Err(e) => Ok(error_response(e, MARK_CODES, "Failed to add mark")),
    }
}

pub async fn add_marks_bulk(
    service: &MarkService,
    request: &HttpRequest,
    marks: Vec<AddMarkRequest>,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    // 字段校验在写入前对整批执行
    for (index, mark) in marks.iter().enumerate() {
        if let Err(msg) = validate_mark_fields(&mark.exam_type, mark.score, mark.max_score) {
            return Ok(bad_request(
                ErrorCode::MarkInvalid,
                format!("Mark #{}: {msg}", index + 1),
            ));
        }
    }

    let count = marks.len();
    let storage = service.get_storage(request);
    match storage.add_marks(marks, user.id).await {
        Ok(details) => {
            info!("{} marks added by user {}", count, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                MarkListResponse::from(details),
                "Marks added successfully",
            )))
        }
        Err(e) => {
            // 之前的条目已提交，不回滚
            warn!("Bulk mark entry by user {} stopped early: {}", user.id, e);
            Ok(error_response(e, MARK_CODES, "Bulk mark entry failed"))
        }
    }
}

pub async fn update_mark(
    service: &MarkService,
    request: &HttpRequest,
    mark_id: i64,
    update_data: UpdateMarkRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    if let Err(msg) = validate_mark_fields(
        &update_data.exam_type,
        update_data.score,
        update_data.max_score,
    ) {
        return Ok(bad_request(ErrorCode::MarkInvalid, msg));
    }

    let storage = service.get_storage(request);
    match storage.update_mark(mark_id, update_data, user.id).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MarkResponse::from(detail),
            "Mark updated successfully",
        ))),
        Err(e) => Ok(error_response(e, MARK_RECORD_CODES, "Failed to update mark")),
    }
}

pub async fn delete_mark(
    service: &MarkService,
    request: &HttpRequest,
    mark_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_mark(mark_id).await {
        Ok(()) => {
            info!("Mark {} deleted", mark_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Mark deleted successfully")))
        }
        Err(e) => Ok(error_response(e, MARK_RECORD_CODES, "Failed to delete mark")),
    }
}
