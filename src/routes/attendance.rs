use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::attendance::requests::{
    ClassAttendanceQuery, ClassAttendanceRequest, MarkAttendanceRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;
use crate::utils::{SafeClassIdI64, SafeIDI64, SafeStudentIdI64};

// 懒加载的全局 AttendanceService 实例
static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

pub async fn mark_attendance(
    req: HttpRequest,
    mark_data: web::Json<MarkAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .mark_attendance(&req, mark_data.into_inner())
        .await
}

pub async fn mark_attendance_bulk(
    req: HttpRequest,
    records: web::Json<Vec<MarkAttendanceRequest>>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .mark_attendance_bulk(&req, records.into_inner())
        .await
}

pub async fn mark_class_attendance(
    req: HttpRequest,
    class_data: web::Json<ClassAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .mark_class_attendance(&req, class_data.into_inner())
        .await
}

pub async fn delete_attendance(
    req: HttpRequest,
    attendance_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .delete_attendance(&req, attendance_id.0)
        .await
}

pub async fn list_my_attendance(req: HttpRequest) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.list_my_attendance(&req).await
}

pub async fn get_my_stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.get_my_stats(&req).await
}

pub async fn list_student_attendance(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_student_attendance(&req, student_id.0)
        .await
}

pub async fn get_student_stats(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.get_student_stats(&req, student_id.0).await
}

pub async fn list_class_attendance(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    query: web::Query<ClassAttendanceQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_class_attendance(&req, class_id.0, query.into_inner().date)
        .await
}

// 配置路由
pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/attendance")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(mark_attendance))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/bulk")
                    .route(web::post().to(mark_attendance_bulk))
                    .wrap(RateLimit::bulk_write())
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/class-bulk")
                    .route(web::post().to(mark_class_attendance))
                    .wrap(RateLimit::bulk_write())
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            // 学生本人
            .service(
                web::resource("/my-attendance")
                    .route(web::get().to(list_my_attendance))
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
            )
            .service(
                web::resource("/my-stats")
                    .route(web::get().to(get_my_stats))
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
            )
            .service(
                web::resource("/student/{student_id}")
                    .route(web::get().to(list_student_attendance))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/student/{student_id}/stats")
                    .route(web::get().to(get_student_stats))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/class/{class_id}")
                    .route(web::get().to(list_class_attendance))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/{id}")
                    .route(web::delete().to(delete_attendance))
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
    use crate::storage::sea_orm_storage::test_support::{create_class, create_user, memory_storage};
    use crate::utils::jwt::JwtUtils;
    use crate::utils::{json_error_handler, query_error_handler};

    fn bearer(user_id: i64, role: &str) -> (&'static str, String) {
        let token = JwtUtils::generate_access_token(user_id, role).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_attendance_http_flow() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "teacher@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "amy@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let app = test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .app_data(web::Data::new(storage.clone()))
                .configure(configure_attendance_routes),
        )
        .await;

        let body = json!({
            "student_id": student.id,
            "class_id": class.id,
            "date": "2025-01-10",
            "status": "present"
        });

        // 未登录
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance")
            .set_json(&body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        // 学生无权记录考勤
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance")
            .insert_header(bearer(student.id, "student"))
            .set_json(&body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/v1/attendance")
            .insert_header(bearer(teacher.id, "teacher"))
            .set_json(&body)
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["code"], 0);
        assert_eq!(resp["data"]["status"], "present");
        assert_eq!(resp["data"]["marked_by_id"], teacher.id);

        // 非法状态值由 JSON 处理器拒绝
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance")
            .insert_header(bearer(teacher.id, "teacher"))
            .set_json(json!({
                "student_id": student.id,
                "class_id": class.id,
                "date": "2025-01-10",
                "status": "sleeping"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        // 班级批量中包含不存在的学生，整批回滚
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/class-bulk")
            .insert_header(bearer(teacher.id, "teacher"))
            .set_json(json!({
                "class_id": class.id,
                "date": "2025-01-11",
                "records": [
                    { "student_id": student.id, "status": "late" },
                    { "student_id": 9999, "status": "present" }
                ]
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/attendance/class/{}?date=2025-01-11", class.id))
            .insert_header(bearer(teacher.id, "teacher"))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["data"]["items"].as_array().map(Vec::len), Some(0));

        // 空批次返回空结果
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/bulk")
            .insert_header(bearer(teacher.id, "teacher"))
            .set_json(json!([]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp: Value = test::read_body_json(resp).await;
        assert_eq!(resp["data"]["items"].as_array().map(Vec::len), Some(0));

        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/class-bulk")
            .insert_header(bearer(teacher.id, "teacher"))
            .set_json(json!({ "class_id": class.id, "date": "2025-01-12", "records": [] }))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["code"], 0);
        assert_eq!(resp["data"]["items"].as_array().map(Vec::len), Some(0));

        // 学生查看自己的统计
        let req = test::TestRequest::get()
            .uri("/api/v1/attendance/my-stats")
            .insert_header(bearer(student.id, "student"))
            .to_request();
        let resp: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["data"]["total"], 1);
        assert_eq!(resp["data"]["attendance_percentage"], 100.0);
    }
}
