use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{
    attendance::{
        entities::{AttendanceDetail, AttendanceStats},
        requests::{ClassAttendanceRequest, MarkAttendanceRequest},
    },
    classes::{
        entities::Class,
        requests::{ClassQueryParams, CreateClassRequest, UpdateClassRequest},
        responses::ClassListResponse,
    },
    dashboard::DashboardStats,
    enrollments::entities::EnrollmentDetail,
    marks::{
        entities::MarkDetail,
        requests::{AddMarkRequest, UpdateMarkRequest},
    },
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, UpdateSubjectRequest},
    },
    teaching_assignments::entities::TeachingAssignmentDetail,
    users::{
        entities::{User, UserRole},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 存储抽象
///
/// 花名册、考勤与成绩相关的写操作在实现内部以单个事务执行，
/// 并在返回前重新读取当前状态，不跨调用缓存实体。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（密码需已哈希）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 切换用户启用状态
    async fn toggle_user_status(&self, id: i64) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;
    // 按角色统计用户数量
    async fn count_users_by_role(&self, role: UserRole) -> Result<u64>;

    /// 班级管理方法
    // 创建班级，名称 + 学年唯一
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    // 列出班级（按名称排序，附带在读人数）
    async fn list_classes(&self, query: ClassQueryParams) -> Result<ClassListResponse>;
    async fn update_class(&self, class_id: i64, update: UpdateClassRequest)
    -> Result<Option<Class>>;
    async fn delete_class(&self, class_id: i64) -> Result<bool>;

    /// 科目管理方法
    // 创建科目，编码（如有）唯一
    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject>;
    async fn get_subject_by_id(&self, subject_id: i64) -> Result<Option<Subject>>;
    async fn list_subjects(&self) -> Result<Vec<Subject>>;
    async fn update_subject(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>>;
    async fn delete_subject(&self, subject_id: i64) -> Result<bool>;

    /// 选课方法
    // 学生选课：学生/班级不存在 -> NotFound；非学生 -> Validation；重复 -> Conflict
    async fn enroll_student(&self, student_id: i64, class_id: i64) -> Result<EnrollmentDetail>;
    // 按选课记录ID退课
    async fn unenroll_student(&self, enrollment_id: i64) -> Result<()>;
    // 按 (学生, 班级) 退课
    async fn unenroll_student_from_class(&self, student_id: i64, class_id: i64) -> Result<()>;
    async fn list_enrollments_by_student(&self, student_id: i64) -> Result<Vec<EnrollmentDetail>>;
    async fn list_enrollments_by_class(&self, class_id: i64) -> Result<Vec<EnrollmentDetail>>;

    /// 授课分配方法
    // 分配教师：教师/班级/科目不存在 -> NotFound；非教师 -> Validation；重复三元组 -> Conflict
    async fn assign_teacher(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<TeachingAssignmentDetail>;
    async fn remove_teaching_assignment(&self, assignment_id: i64) -> Result<()>;
    async fn list_assignments_by_teacher(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeachingAssignmentDetail>>;
    async fn list_assignments_by_class(&self, class_id: i64)
    -> Result<Vec<TeachingAssignmentDetail>>;

    /// 考勤方法
    // 按 (学生, 班级, 日期) 新增或覆盖
    async fn mark_attendance(
        &self,
        request: MarkAttendanceRequest,
        marked_by: i64,
    ) -> Result<AttendanceDetail>;
    // 批量考勤，整批在同一事务内，任一失败全部回滚；返回顺序与输入一致
    async fn mark_attendance_batch(
        &self,
        requests: Vec<MarkAttendanceRequest>,
        marked_by: i64,
    ) -> Result<Vec<AttendanceDetail>>;
    // 班级批量考勤，先校验班级存在
    async fn mark_class_attendance(
        &self,
        request: ClassAttendanceRequest,
        marked_by: i64,
    ) -> Result<Vec<AttendanceDetail>>;
    async fn delete_attendance(&self, attendance_id: i64) -> Result<()>;
    // 学生考勤历史，日期倒序
    async fn list_student_attendance(&self, student_id: i64) -> Result<Vec<AttendanceDetail>>;
    // 班级某日考勤
    async fn list_class_attendance(
        &self,
        class_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceDetail>>;
    async fn get_student_attendance_stats(&self, student_id: i64) -> Result<AttendanceStats>;

    /// 成绩方法
    // 新增成绩，总是插入新行
    async fn add_mark(&self, request: AddMarkRequest, graded_by: i64) -> Result<MarkDetail>;
    // 逐条新增，每条独立提交，遇错即停，已提交的保留
    async fn add_marks(
        &self,
        requests: Vec<AddMarkRequest>,
        graded_by: i64,
    ) -> Result<Vec<MarkDetail>>;
    async fn update_mark(
        &self,
        mark_id: i64,
        update: UpdateMarkRequest,
        graded_by: i64,
    ) -> Result<MarkDetail>;
    async fn delete_mark(&self, mark_id: i64) -> Result<()>;
    // 学生成绩，考试日期倒序
    async fn list_student_marks(&self, student_id: i64) -> Result<Vec<MarkDetail>>;
    async fn list_class_subject_marks(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<MarkDetail>>;
    // 平均百分比，无成绩时为 None
    async fn get_student_average(&self, student_id: i64) -> Result<Option<f64>>;
    async fn get_class_subject_average(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Option<f64>>;

    /// 统计方法
    async fn get_dashboard_stats(&self) -> Result<DashboardStats>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
