use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{UpdateUserRequest, UserListParams};
use crate::services::UserService;
use crate::utils::SafeIDI64;

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

// HTTP处理程序
pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn list_students(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .list_users_by_role(query.into_inner(), UserRole::Student, &req)
        .await
}

pub async fn list_teachers(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .list_users_by_role(query.into_inner(), UserRole::Teacher, &req)
        .await
}

pub async fn get_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(user_id.0, &req).await
}

pub async fn update_user(
    req: HttpRequest,
    user_id: SafeIDI64,
    update_data: web::Json<UpdateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_user(user_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn toggle_user_status(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.toggle_user_status(user_id.0, &req).await
}

pub async fn delete_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.delete_user(user_id.0, &req).await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_users))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            // 学生列表 - 管理员和教师
            .service(
                web::resource("/students")
                    .route(web::get().to(list_students))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/teachers")
                    .route(web::get().to(list_teachers))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(
                web::resource("/{id}")
                    // 查看与修改 - 管理员或本人（业务层校验）
                    .route(web::get().to(get_user))
                    .route(web::put().to(update_user))
                    .route(
                        web::delete()
                            .to(delete_user)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/toggle-status")
                    .route(web::patch().to(toggle_user_status))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            ),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    use super::*;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::test_support::{create_user, memory_storage};
    use crate::utils::jwt::JwtUtils;

    fn bearer(user_id: i64, role: &str) -> (&'static str, String) {
        let token = JwtUtils::generate_access_token(user_id, role).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_profile_access_and_deactivation() {
        let storage = memory_storage().await;
        let admin = create_user(&storage, "admin@school.test", UserRole::Admin).await;
        let amy = create_user(&storage, "amy@school.test", UserRole::Student).await;
        let ben = create_user(&storage, "ben@school.test", UserRole::Student).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .configure(configure_user_routes),
        )
        .await;

        // 学生只能查看自己
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}", ben.id))
            .insert_header(bearer(amy.id, "student"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}", amy.id))
            .insert_header(bearer(amy.id, "student"))
            .set_json(json!({ "phone": "555-0100" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["user"]["phone"], "555-0100");

        // 学生列表仅限管理员和教师
        let req = test::TestRequest::get()
            .uri("/api/v1/users/students")
            .insert_header(bearer(amy.id, "student"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/users/students")
            .insert_header(bearer(admin.id, "admin"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["pagination"]["total"], 2);

        // 停用后原令牌失效
        let req = test::TestRequest::patch()
            .uri(&format!("/api/v1/users/{}/toggle-status", ben.id))
            .insert_header(bearer(admin.id, "admin"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["user"]["is_active"], false);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}", ben.id))
            .insert_header(bearer(ben.id, "student"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        // 不能删除自己
        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/users/{}", admin.id))
            .insert_header(bearer(admin.id, "admin"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
