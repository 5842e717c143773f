use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::{
    teaching_assignments::requests::AssignTeacherRequest, users::entities::UserRole,
};
use crate::services::TeachingAssignmentService;
use crate::utils::{SafeClassIdI64, SafeIDI64, SafeTeacherIdI64};

static ASSIGNMENT_SERVICE: Lazy<TeachingAssignmentService> =
    Lazy::new(TeachingAssignmentService::new_lazy);

pub async fn assign_teacher(
    req: HttpRequest,
    assign_data: web::Json<AssignTeacherRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .assign_teacher(&req, assign_data.into_inner())
        .await
}

pub async fn remove_assignment(
    req: HttpRequest,
    assignment_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .remove_assignment(&req, assignment_id.0)
        .await
}

pub async fn list_my_classes(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_my_classes(&req).await
}

pub async fn list_by_teacher(
    req: HttpRequest,
    teacher_id: SafeTeacherIdI64,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_by_teacher(&req, teacher_id.0).await
}

pub async fn list_by_class(req: HttpRequest, class_id: SafeClassIdI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_by_class(&req, class_id.0).await
}

pub fn configure_teaching_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teaching-assignments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(assign_teacher))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            // 教师查看自己的授课班级
            .service(
                web::resource("/my-classes")
                    .route(web::get().to(list_my_classes))
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
            )
            .service(
                web::resource("/teacher/{teacher_id}")
                    .route(web::get().to(list_by_teacher))
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles())),
            )
            .service(
                web::resource("/class/{class_id}")
                    .route(web::get().to(list_by_class))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(
                web::resource("/{id}")
                    .route(web::delete().to(remove_assignment))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            ),
    );
}
