use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::errors::Result;
use crate::models::teaching_assignments::{
    entities::TeachingAssignmentDetail,
    requests::AssignTeacherRequest,
    responses::{TeachingAssignmentListResponse, TeachingAssignmentResponse},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{DomainCodes, current_user, error_response};

super::storage_backed_service!(TeachingAssignmentService);

const ASSIGNMENT_CODES: DomainCodes = DomainCodes {
    not_found: ErrorCode::NotFound,
    conflict: ErrorCode::AssignmentAlreadyExists,
    invalid: ErrorCode::BadRequest,
};

fn list_response(result: Result<Vec<TeachingAssignmentDetail>>) -> HttpResponse {
    match result {
        Ok(details) => HttpResponse::Ok().json(ApiResponse::success(
            TeachingAssignmentListResponse::from(details),
            "Teaching assignments retrieved successfully",
        )),
        Err(e) => error_response(
            e,
            ASSIGNMENT_CODES,
            "Failed to retrieve teaching assignments",
        ),
    }
}

impl TeachingAssignmentService {
    pub async fn assign_teacher(
        &self,
        request: &HttpRequest,
        assign_data: AssignTeacherRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        match storage
            .assign_teacher(
                assign_data.teacher_id,
                assign_data.class_id,
                assign_data.subject_id,
            )
            .await
        {
            Ok(detail) => {
                info!(
                    "Teacher {} assigned to class {} (subject {:?})",
                    detail.teacher.id, detail.class.id, detail.assignment.subject_id
                );
                Ok(HttpResponse::Created().json(ApiResponse::success(
                    TeachingAssignmentResponse::from(detail),
                    "Teacher assigned successfully",
                )))
            }
            Err(e) => Ok(error_response(
                e,
                ASSIGNMENT_CODES,
                "Teaching assignment failed",
            )),
        }
    }

    pub async fn remove_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);

        match storage.remove_teaching_assignment(assignment_id).await {
            Ok(()) => {
                info!("Teaching assignment {} removed", assignment_id);
                Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                    "Teaching assignment removed successfully",
                )))
            }
            Err(e) => Ok(error_response(
                e,
                DomainCodes {
                    not_found: ErrorCode::AssignmentNotFound,
                    ..ASSIGNMENT_CODES
                },
                "Failed to remove teaching assignment",
            )),
        }
    }

    // 当前教师的授课班级
    pub async fn list_my_classes(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match current_user(request) {
            Ok(user) => user,
            Err(response) => return Ok(response),
        };
        let storage = self.get_storage(request);
        Ok(list_response(
            storage.list_assignments_by_teacher(user.id).await,
        ))
    }

    pub async fn list_by_teacher(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        Ok(list_response(
            storage.list_assignments_by_teacher(teacher_id).await,
        ))
    }

    pub async fn list_by_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        Ok(list_response(
            storage.list_assignments_by_class(class_id).await,
        ))
    }
}
