//! 授课分配存储操作

use super::SeaOrmStorage;
use super::lookups::{
    count_enrolled, is_unique_violation, load_classes, load_subjects, load_users, require_class,
    require_subject, require_user, take_related,
};
use crate::entity::teaching_assignments::{ActiveModel, Column, Entity as Assignments, Model};
use crate::errors::{EduPortalError, Result};
use crate::models::teaching_assignments::entities::TeachingAssignmentDetail;
use crate::models::users::entities::UserRole;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;

impl SeaOrmStorage {
    /// 分配教师到班级（可选科目）
    ///
    /// (教师, 班级, 科目) 三元组唯一，科目为空也参与比较。
    pub async fn assign_teacher_impl(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<TeachingAssignmentDetail> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("开启事务失败: {e}")))?;

        let teacher = require_user(&txn, teacher_id, "Teacher").await?;
        if teacher.role != UserRole::Teacher {
            return Err(EduPortalError::validation(format!(
                "User {teacher_id} is not a teacher"
            )));
        }
        let class = require_class(&txn, class_id).await?;
        let subject = match subject_id {
            Some(id) => Some(require_subject(&txn, id).await?),
            None => None,
        };

        // 先查重给出明确的冲突错误，部分唯一索引兜底并发插入
        let mut duplicate = Assignments::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::ClassId.eq(class_id));
        duplicate = match subject_id {
            Some(id) => duplicate.filter(Column::SubjectId.eq(id)),
            None => duplicate.filter(Column::SubjectId.is_null()),
        };
        let existing = duplicate
            .one(&txn)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询授课分配失败: {e}")))?;
        if existing.is_some() {
            return Err(EduPortalError::conflict(
                "Teacher is already assigned to this class and subject",
            ));
        }

        let model = ActiveModel {
            teacher_id: Set(teacher_id),
            class_id: Set(class_id),
            subject_id: Set(subject_id),
            assigned_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let inserted = model.insert(&txn).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduPortalError::conflict("Teacher is already assigned to this class and subject")
            } else {
                EduPortalError::database_operation(format!("创建授课分配失败: {e}"))
            }
        })?;

        let student_count = count_enrolled(&txn, &[class_id])
            .await?
            .get(&class_id)
            .copied()
            .unwrap_or(0);

        txn.commit()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("提交事务失败: {e}")))?;

        debug!(
            "教师 {} 已分配到班级 {}，科目 {:?}",
            teacher_id, class_id, subject_id
        );

        Ok(TeachingAssignmentDetail {
            assignment: inserted.into_teaching_assignment(),
            teacher,
            class,
            subject,
            student_count,
        })
    }

    pub async fn remove_teaching_assignment_impl(&self, assignment_id: i64) -> Result<()> {
        let result = Assignments::delete_by_id(assignment_id)
            .exec(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("删除授课分配失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(EduPortalError::not_found(format!(
                "Teaching assignment not found with id: {assignment_id}"
            )));
        }
        Ok(())
    }

    pub async fn list_assignments_by_teacher_impl(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeachingAssignmentDetail>> {
        let rows = Assignments::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::AssignedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询授课分配失败: {e}")))?;

        enrich_assignments(&self.db, rows).await
    }

    pub async fn list_assignments_by_class_impl(
        &self,
        class_id: i64,
    ) -> Result<Vec<TeachingAssignmentDetail>> {
        let rows = Assignments::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::AssignedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询授课分配失败: {e}")))?;

        enrich_assignments(&self.db, rows).await
    }
}

/// 为授课分配附加教师、班级、科目与班级人数
async fn enrich_assignments<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<Model>,
) -> Result<Vec<TeachingAssignmentDetail>> {
    let teachers = load_users(conn, rows.iter().map(|r| r.teacher_id)).await?;
    let classes = load_classes(conn, rows.iter().map(|r| r.class_id)).await?;
    let subjects = load_subjects(conn, rows.iter().filter_map(|r| r.subject_id)).await?;
    let class_ids: Vec<i64> = classes.keys().copied().collect();
    let counts = count_enrolled(conn, &class_ids).await?;

    rows.into_iter()
        .map(|row| {
            let subject = match row.subject_id {
                Some(id) => Some(take_related(&subjects, id, "科目")?),
                None => None,
            };
            Ok(TeachingAssignmentDetail {
                teacher: take_related(&teachers, row.teacher_id, "教师")?,
                class: take_related(&classes, row.class_id, "班级")?,
                subject,
                student_count: counts.get(&row.class_id).copied().unwrap_or(0),
                assignment: row.into_teaching_assignment(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::lookups::is_unique_violation;
    use super::super::test_support::{create_class, create_subject, create_user, memory_storage};
    use crate::entity::teaching_assignments::ActiveModel;
    use crate::models::users::entities::UserRole;
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn test_general_assignment_twice_is_conflict() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let class = create_class(&storage, "5A").await;

        storage
            .assign_teacher_impl(teacher.id, class.id, None)
            .await
            .unwrap();
        let err = storage
            .assign_teacher_impl(teacher.id, class.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn test_general_assignment_unique_at_database_level() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let class = create_class(&storage, "5A").await;
        let subject = create_subject(&storage, "Math").await;

        storage
            .assign_teacher_impl(teacher.id, class.id, None)
            .await
            .unwrap();

        // 绕过应用层查重，直接写库
        let general = |subject_id: Option<i64>| ActiveModel {
            teacher_id: Set(teacher.id),
            class_id: Set(class.id),
            subject_id: Set(subject_id),
            assigned_at: Set(0),
            ..Default::default()
        };
        let err = general(None).insert(&storage.db).await.unwrap_err();
        assert!(is_unique_violation(&err));

        general(Some(subject.id)).insert(&storage.db).await.unwrap();
    }

    #[tokio::test]
    async fn test_different_subjects_both_succeed() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;
        let math = create_subject(&storage, "Math").await;
        let science = create_subject(&storage, "Science").await;
        storage.enroll_student_impl(student.id, class.id).await.unwrap();

        let first = storage
            .assign_teacher_impl(teacher.id, class.id, Some(math.id))
            .await
            .unwrap();
        assert_eq!(first.student_count, 1);
        assert_eq!(first.subject.as_ref().map(|s| s.name.as_str()), Some("Math"));

        storage
            .assign_teacher_impl(teacher.id, class.id, Some(science.id))
            .await
            .unwrap();

        let listed = storage
            .list_assignments_by_teacher_impl(teacher.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|a| a.student_count == 1));
    }

    #[tokio::test]
    async fn test_student_cannot_be_assigned() {
        let storage = memory_storage().await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;

        let err = storage
            .assign_teacher_impl(student.id, class.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E004");

        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let err = storage
            .assign_teacher_impl(teacher.id, class.id, Some(77))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[tokio::test]
    async fn test_remove_missing_assignment_is_not_found() {
        let storage = memory_storage().await;
        let err = storage.remove_teaching_assignment_impl(1).await.unwrap_err();
        assert_eq!(err.code(), "E005");
    }
}
