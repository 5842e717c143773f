use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::ApiResponse;
use crate::services::{DomainCodes, error_response};

super::storage_backed_service!(DashboardService);

impl DashboardService {
    // 管理员仪表盘计数
    pub async fn get_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        match storage.get_dashboard_stats().await {
            Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                stats,
                "Dashboard statistics retrieved successfully",
            ))),
            Err(e) => Ok(error_response(
                e,
                DomainCodes::GENERIC,
                "Failed to retrieve dashboard statistics",
            )),
        }
    }
}
