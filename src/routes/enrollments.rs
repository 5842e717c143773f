use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::{enrollments::requests::EnrollStudentRequest, users::entities::UserRole};
use crate::services::EnrollmentService;
use crate::utils::{SafeClassIdI64, SafeIDI64, SafeStudentClassPath, SafeStudentIdI64};

static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

pub async fn enroll_student(
    req: HttpRequest,
    enroll_data: web::Json<EnrollStudentRequest>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .enroll_student(&req, enroll_data.into_inner())
        .await
}

pub async fn unenroll(req: HttpRequest, enrollment_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.unenroll(&req, enrollment_id.0).await
}

pub async fn unenroll_from_class(
    req: HttpRequest,
    path: SafeStudentClassPath,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .unenroll_from_class(&req, path.student_id, path.class_id)
        .await
}

pub async fn list_my_classes(req: HttpRequest) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.list_my_classes(&req).await
}

pub async fn list_by_student(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.list_by_student(&req, student_id.0).await
}

pub async fn list_by_class(req: HttpRequest, class_id: SafeClassIdI64) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.list_by_class(&req, class_id.0).await
}

pub fn configure_enrollment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/enrollments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(enroll_student))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            // 学生查看自己的班级
            .service(
                web::resource("/my-classes")
                    .route(web::get().to(list_my_classes))
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
            )
            .service(
                web::resource("/student/{student_id}")
                    .route(web::get().to(list_by_student))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/class/{class_id}")
                    .route(web::get().to(list_by_class))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/student/{student_id}/class/{class_id}")
                    .route(web::delete().to(unenroll_from_class))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(
                web::resource("/{id}")
                    .route(web::delete().to(unenroll))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            ),
    );
}
