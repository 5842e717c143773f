//! 选课存储操作

use super::SeaOrmStorage;
use super::lookups::{
    is_unique_violation, load_classes, load_users, require_class, require_user, take_related,
};
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments, Model};
use crate::errors::{EduPortalError, Result};
use crate::models::enrollments::entities::EnrollmentDetail;
use crate::models::users::entities::UserRole;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;

impl SeaOrmStorage {
    /// 学生选课
    ///
    /// 校验顺序：学生存在 -> 角色为学生 -> 班级存在 -> 未重复选课。
    pub async fn enroll_student_impl(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<EnrollmentDetail> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("开启事务失败: {e}")))?;

        let student = require_user(&txn, student_id, "Student").await?;
        if student.role != UserRole::Student {
            return Err(EduPortalError::validation(format!(
                "User {student_id} is not a student"
            )));
        }
        let class = require_class(&txn, class_id).await?;

        let existing = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::ClassId.eq(class_id))
            .one(&txn)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询选课记录失败: {e}")))?;
        if existing.is_some() {
            return Err(EduPortalError::conflict(format!(
                "Student {student_id} is already enrolled in class {class_id}"
            )));
        }

        let model = ActiveModel {
            student_id: Set(student_id),
            class_id: Set(class_id),
            enrolled_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let inserted = model.insert(&txn).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduPortalError::conflict(format!(
                    "Student {student_id} is already enrolled in class {class_id}"
                ))
            } else {
                EduPortalError::database_operation(format!("创建选课记录失败: {e}"))
            }
        })?;

        txn.commit()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("提交事务失败: {e}")))?;

        debug!("学生 {} 已加入班级 {}", student_id, class_id);

        Ok(EnrollmentDetail {
            enrollment: inserted.into_enrollment(),
            student,
            class,
        })
    }

    /// 按选课 ID 退课
    pub async fn unenroll_student_impl(&self, enrollment_id: i64) -> Result<()> {
        let result = Enrollments::delete_by_id(enrollment_id)
            .exec(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("删除选课记录失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(EduPortalError::not_found(format!(
                "Enrollment not found with id: {enrollment_id}"
            )));
        }
        Ok(())
    }

    /// 按 (学生, 班级) 退课
    pub async fn unenroll_student_from_class_impl(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<()> {
        let result = Enrollments::delete_many()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::ClassId.eq(class_id))
            .exec(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("删除选课记录失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(EduPortalError::not_found(format!(
                "Student {student_id} is not enrolled in class {class_id}"
            )));
        }
        Ok(())
    }

    pub async fn list_enrollments_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<EnrollmentDetail>> {
        let rows = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::EnrolledAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询选课记录失败: {e}")))?;

        enrich_enrollments(&self.db, rows).await
    }

    pub async fn list_enrollments_by_class_impl(
        &self,
        class_id: i64,
    ) -> Result<Vec<EnrollmentDetail>> {
        let rows = Enrollments::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::EnrolledAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询选课记录失败: {e}")))?;

        enrich_enrollments(&self.db, rows).await
    }
}

/// 为选课记录附加学生和班级
async fn enrich_enrollments<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<Model>,
) -> Result<Vec<EnrollmentDetail>> {
    let students = load_users(conn, rows.iter().map(|r| r.student_id)).await?;
    let classes = load_classes(conn, rows.iter().map(|r| r.class_id)).await?;

    rows.into_iter()
        .map(|row| {
            Ok(EnrollmentDetail {
                student: take_related(&students, row.student_id, "学生")?,
                class: take_related(&classes, row.class_id, "班级")?,
                enrollment: row.into_enrollment(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_class, create_user, memory_storage};
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_enroll_twice_is_conflict() {
        let storage = memory_storage().await;
        let student = create_user(&storage, "alice@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;

        let detail = storage
            .enroll_student_impl(student.id, class.id)
            .await
            .unwrap();
        assert_eq!(detail.student.full_name, "alice");
        assert_eq!(detail.class.name, "5A");

        let err = storage
            .enroll_student_impl(student.id, class.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn test_enroll_teacher_is_rejected_before_class_lookup() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "bob@school.test", UserRole::Teacher).await;

        // 班级不存在，但角色错误优先报告
        let err = storage.enroll_student_impl(teacher.id, 4242).await.unwrap_err();
        assert_eq!(err.code(), "E004");

        let err = storage.enroll_student_impl(9999, 4242).await.unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[tokio::test]
    async fn test_unenroll_by_id_and_pair() {
        let storage = memory_storage().await;
        let student = create_user(&storage, "carol@school.test", UserRole::Student).await;
        let a = create_class(&storage, "5A").await;
        let b = create_class(&storage, "5B").await;

        let first = storage.enroll_student_impl(student.id, a.id).await.unwrap();
        storage.enroll_student_impl(student.id, b.id).await.unwrap();
        assert_eq!(
            storage
                .list_enrollments_by_student_impl(student.id)
                .await
                .unwrap()
                .len(),
            2
        );

        storage
            .unenroll_student_impl(first.enrollment.id)
            .await
            .unwrap();
        let err = storage
            .unenroll_student_impl(first.enrollment.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");

        storage
            .unenroll_student_from_class_impl(student.id, b.id)
            .await
            .unwrap();
        let err = storage
            .unenroll_student_from_class_impl(student.id, b.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");

        assert!(
            storage
                .list_enrollments_by_class_impl(b.id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
