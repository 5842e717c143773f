use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::marks::requests::{AddMarkRequest, UpdateMarkRequest};
use crate::models::users::entities::UserRole;
use crate::services::MarkService;
use crate::utils::{SafeClassIdI64, SafeIDI64, SafeStudentIdI64, SafeSubjectIdI64};

// 懒加载的全局 MarkService 实例
static MARK_SERVICE: Lazy<MarkService> = Lazy::new(MarkService::new_lazy);

pub async fn add_mark(
    req: HttpRequest,
    mark_data: web::Json<AddMarkRequest>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.add_mark(&req, mark_data.into_inner()).await
}

pub async fn add_marks_bulk(
    req: HttpRequest,
    marks: web::Json<Vec<AddMarkRequest>>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.add_marks_bulk(&req, marks.into_inner()).await
}

pub async fn update_mark(
    req: HttpRequest,
    mark_id: SafeIDI64,
    update_data: web::Json<UpdateMarkRequest>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE
        .update_mark(&req, mark_id.0, update_data.into_inner())
        .await
}

pub async fn delete_mark(req: HttpRequest, mark_id: SafeIDI64) -> ActixResult<HttpResponse> {
    MARK_SERVICE.delete_mark(&req, mark_id.0).await
}

pub async fn list_my_marks(req: HttpRequest) -> ActixResult<HttpResponse> {
    MARK_SERVICE.list_my_marks(&req).await
}

pub async fn get_my_average(req: HttpRequest) -> ActixResult<HttpResponse> {
    MARK_SERVICE.get_my_average(&req).await
}

pub async fn list_student_marks(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.list_student_marks(&req, student_id.0).await
}

pub async fn get_student_average(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.get_student_average(&req, student_id.0).await
}

pub async fn list_class_subject_marks(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    subject_id: SafeSubjectIdI64,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE
        .list_class_subject_marks(&req, class_id.0, subject_id.0)
        .await
}

pub async fn get_class_subject_average(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    subject_id: SafeSubjectIdI64,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE
        .get_class_subject_average(&req, class_id.0, subject_id.0)
        .await
}

// 配置路由
pub fn configure_mark_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/marks")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(add_mark))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/bulk")
                    .route(web::post().to(add_marks_bulk))
                    .wrap(RateLimit::bulk_write())
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/my-marks")
                    .route(web::get().to(list_my_marks))
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
            )
            .service(
                web::resource("/my-average")
                    .route(web::get().to(get_my_average))
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
            )
            .service(
                web::resource("/student/{student_id}")
                    .route(web::get().to(list_student_marks))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/student/{student_id}/average")
                    .route(web::get().to(get_student_average))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/class/{class_id}/subject/{subject_id}")
                    .route(web::get().to(list_class_subject_marks))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/class/{class_id}/subject/{subject_id}/average")
                    .route(web::get().to(get_class_subject_average))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/{id}")
                    // 修改成绩 - 管理员和教师
                    .route(
                        web::put()
                            .to(update_mark)
                            .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
                    )
                    // 删除成绩 - 仅管理员
                    .route(
                        web::delete()
                            .to(delete_mark)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
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
    use crate::storage::sea_orm_storage::test_support::{
        create_class, create_subject, create_user, memory_storage,
    };
    use crate::utils::jwt::JwtUtils;

    fn bearer(user_id: i64, role: &str) -> (&'static str, String) {
        let token = JwtUtils::generate_access_token(user_id, role).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_mark_entry_and_average() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "teacher@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "ben@school.test", UserRole::Student).await;
        let class = create_class(&storage, "6B").await;
        let subject = create_subject(&storage, "Mathematics").await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .configure(configure_mark_routes),
        )
        .await;

        // 满分为 0 被拒绝
        let req = test::TestRequest::post()
            .uri("/api/v1/marks")
            .insert_header(bearer(teacher.id, "teacher"))
            .set_json(json!({
                "student_id": student.id,
                "class_id": class.id,
                "subject_id": subject.id,
                "exam_type": "Quiz",
                "score": 10.0,
                "max_score": 0.0
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/marks")
            .insert_header(bearer(teacher.id, "teacher"))
            .set_json(json!({
                "student_id": student.id,
                "class_id": class.id,
                "subject_id": subject.id,
                "exam_type": "Unit Test",
                "score": 42.0,
                "max_score": 50.0,
                "exam_date": "2025-02-01"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["percentage"], 84.0);
        assert_eq!(body["data"]["grade"], "A-");
        let mark_id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/v1/marks/my-average")
            .insert_header(bearer(student.id, "student"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["average"], 84.0);

        // 中点百分比向上舍入
        let req = test::TestRequest::post()
            .uri("/api/v1/marks/bulk")
            .insert_header(bearer(teacher.id, "teacher"))
            .set_json(json!([{
                "student_id": student.id,
                "class_id": class.id,
                "subject_id": subject.id,
                "exam_type": "Quiz",
                "score": 0.46,
                "max_score": 80
            }]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["items"][0]["score"], 0.46);
        assert_eq!(body["data"]["items"][0]["percentage"], 0.58);

        // 空批次返回空结果
        let req = test::TestRequest::post()
            .uri("/api/v1/marks/bulk")
            .insert_header(bearer(teacher.id, "teacher"))
            .set_json(json!([]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));

        // 教师不能删除成绩
        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/marks/{mark_id}"))
            .insert_header(bearer(teacher.id, "teacher"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
