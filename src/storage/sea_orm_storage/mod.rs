//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 花名册、考勤、成绩的写操作在此以事务形式实现。

mod attendance;
mod classes;
mod dashboard;
mod enrollments;
mod lookups;
mod marks;
mod subjects;
mod teaching_assignments;
mod users;

#[cfg(test)]
pub(crate) mod test_support;

use crate::config::AppConfig;
use crate::errors::{EduPortalError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 使用已建立的连接创建存储实例（不运行迁移）
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EduPortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| EduPortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| EduPortalError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EduPortalError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn toggle_user_status(&self, id: i64) -> Result<Option<User>> {
        self.toggle_user_status_impl(id).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn count_users_by_role(&self, role: UserRole) -> Result<u64> {
        self.count_users_by_role_impl(role).await
    }

    // 班级模块
    async fn create_class(&self, class: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn list_classes(&self, query: ClassQueryParams) -> Result<ClassListResponse> {
        self.list_classes_impl(query).await
    }

    async fn update_class(
        &self,
        class_id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        self.update_class_impl(class_id, update).await
    }

    async fn delete_class(&self, class_id: i64) -> Result<bool> {
        self.delete_class_impl(class_id).await
    }

    // 科目模块
    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject> {
        self.create_subject_impl(subject).await
    }

    async fn get_subject_by_id(&self, subject_id: i64) -> Result<Option<Subject>> {
        self.get_subject_by_id_impl(subject_id).await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.list_subjects_impl().await
    }

    async fn update_subject(
        &self,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        self.update_subject_impl(subject_id, update).await
    }

    async fn delete_subject(&self, subject_id: i64) -> Result<bool> {
        self.delete_subject_impl(subject_id).await
    }

    // 选课模块
    async fn enroll_student(&self, student_id: i64, class_id: i64) -> Result<EnrollmentDetail> {
        self.enroll_student_impl(student_id, class_id).await
    }

    async fn unenroll_student(&self, enrollment_id: i64) -> Result<()> {
        self.unenroll_student_impl(enrollment_id).await
    }

    async fn unenroll_student_from_class(&self, student_id: i64, class_id: i64) -> Result<()> {
        self.unenroll_student_from_class_impl(student_id, class_id)
            .await
    }

    async fn list_enrollments_by_student(&self, student_id: i64) -> Result<Vec<EnrollmentDetail>> {
        self.list_enrollments_by_student_impl(student_id).await
    }

    async fn list_enrollments_by_class(&self, class_id: i64) -> Result<Vec<EnrollmentDetail>> {
        self.list_enrollments_by_class_impl(class_id).await
    }

    // 授课分配模块
    async fn assign_teacher(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<TeachingAssignmentDetail> {
        self.assign_teacher_impl(teacher_id, class_id, subject_id)
            .await
    }

    async fn remove_teaching_assignment(&self, assignment_id: i64) -> Result<()> {
        self.remove_teaching_assignment_impl(assignment_id).await
    }

    async fn list_assignments_by_teacher(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeachingAssignmentDetail>> {
        self.list_assignments_by_teacher_impl(teacher_id).await
    }

    async fn list_assignments_by_class(
        &self,
        class_id: i64,
    ) -> Result<Vec<TeachingAssignmentDetail>> {
        self.list_assignments_by_class_impl(class_id).await
    }

    // 考勤模块
    async fn mark_attendance(
        &self,
        request: MarkAttendanceRequest,
        marked_by: i64,
    ) -> Result<AttendanceDetail> {
        self.mark_attendance_impl(request, marked_by).await
    }

    async fn mark_attendance_batch(
        &self,
        requests: Vec<MarkAttendanceRequest>,
        marked_by: i64,
    ) -> Result<Vec<AttendanceDetail>> {
        self.mark_attendance_batch_impl(requests, marked_by).await
    }

    async fn mark_class_attendance(
        &self,
        request: ClassAttendanceRequest,
        marked_by: i64,
    ) -> Result<Vec<AttendanceDetail>> {
        self.mark_class_attendance_impl(request, marked_by).await
    }

    async fn delete_attendance(&self, attendance_id: i64) -> Result<()> {
        self.delete_attendance_impl(attendance_id).await
    }

    async fn list_student_attendance(&self, student_id: i64) -> Result<Vec<AttendanceDetail>> {
        self.list_student_attendance_impl(student_id).await
    }

    async fn list_class_attendance(
        &self,
        class_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceDetail>> {
        self.list_class_attendance_impl(class_id, date).await
    }

    async fn get_student_attendance_stats(&self, student_id: i64) -> Result<AttendanceStats> {
        self.get_student_attendance_stats_impl(student_id).await
    }

    // 成绩模块
    async fn add_mark(&self, request: AddMarkRequest, graded_by: i64) -> Result<MarkDetail> {
        self.add_mark_impl(request, graded_by).await
    }

    async fn add_marks(
        &self,
        requests: Vec<AddMarkRequest>,
        graded_by: i64,
    ) -> Result<Vec<MarkDetail>> {
        self.add_marks_impl(requests, graded_by).await
    }

    async fn update_mark(
        &self,
        mark_id: i64,
        update: UpdateMarkRequest,
        graded_by: i64,
    ) -> Result<MarkDetail> {
        self.update_mark_impl(mark_id, update, graded_by).await
    }

    async fn delete_mark(&self, mark_id: i64) -> Result<()> {
        self.delete_mark_impl(mark_id).await
    }

    async fn list_student_marks(&self, student_id: i64) -> Result<Vec<MarkDetail>> {
        self.list_student_marks_impl(student_id).await
    }

    async fn list_class_subject_marks(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<MarkDetail>> {
        self.list_class_subject_marks_impl(class_id, subject_id)
            .await
    }

    async fn get_student_average(&self, student_id: i64) -> Result<Option<f64>> {
        self.get_student_average_impl(student_id).await
    }

    async fn get_class_subject_average(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Option<f64>> {
        self.get_class_subject_average_impl(class_id, subject_id)
            .await
    }

    // 统计模块
    async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        self.get_dashboard_stats_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("eduportal.db").unwrap(),
            "sqlite://eduportal.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/school").unwrap(),
            "postgres://u:p@localhost/school"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nowhere").is_err());
    }
}
