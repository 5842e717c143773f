use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{USER_CODES, UserService};
use crate::models::{
    ApiResponse,
    users::{
        entities::UserRole,
        requests::{UserListParams, UserListQuery},
    },
};
use crate::services::error_response;

/// `role` 为路由固定的角色（学生、教师列表），优先于查询参数
pub async fn list_users(
    service: &UserService,
    query: UserListParams,
    role: Option<UserRole>,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let (page, size) = query.pagination.normalized();
    let list_query = UserListQuery {
        page: Some(page as i64),
        size: Some(size as i64),
        role: role.or(query.role),
        search: query.search,
    };

    match storage.list_users_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "User list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(e, USER_CODES, "Failed to retrieve user list")),
    }
}
