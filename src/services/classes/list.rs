use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CLASS_CODES, ClassService};
use crate::models::{ApiResponse, classes::requests::ClassQueryParams};
use crate::services::error_response;

pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    query: ClassQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_classes(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Class list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(
            e,
            CLASS_CODES,
            "Failed to retrieve class list",
        )),
    }
}
