//! 事务内共享的查询辅助函数
//!
//! 所有函数都接受任意 `ConnectionTrait`，以便在同一事务中复用。

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, SqlErr,
};

use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::entity::subjects::{Column as SubjectColumn, Entity as Subjects};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{EduPortalError, Result};
use crate::models::{classes::entities::Class, subjects::entities::Subject, users::entities::User};

/// 是否为唯一约束冲突
pub(super) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(super) async fn find_user<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<User>> {
    let result = Users::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("查询用户失败: {e}")))?;

    Ok(result.map(|m| m.into_user()))
}

/// 查询用户，不存在时返回 NotFound（`label` 用于错误信息，如 "Student"）
pub(super) async fn require_user<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    label: &str,
) -> Result<User> {
    find_user(conn, id)
        .await?
        .ok_or_else(|| EduPortalError::not_found(format!("{label} not found with id: {id}")))
}

pub(super) async fn require_class<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Class> {
    Classes::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("查询班级失败: {e}")))?
        .map(|m| m.into_class())
        .ok_or_else(|| EduPortalError::not_found(format!("Class not found with id: {id}")))
}

pub(super) async fn require_subject<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Subject> {
    Subjects::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("查询科目失败: {e}")))?
        .map(|m| m.into_subject())
        .ok_or_else(|| EduPortalError::not_found(format!("Subject not found with id: {id}")))
}

/// 批量加载用户，用于列表视图的显示字段
pub(super) async fn load_users<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, User>> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = Users::find()
        .filter(UserColumn::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("批量查询用户失败: {e}")))?;

    Ok(users.into_iter().map(|m| (m.id, m.into_user())).collect())
}

pub(super) async fn load_classes<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, Class>> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let classes = Classes::find()
        .filter(ClassColumn::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("批量查询班级失败: {e}")))?;

    Ok(classes.into_iter().map(|m| (m.id, m.into_class())).collect())
}

pub(super) async fn load_subjects<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, Subject>> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let subjects = Subjects::find()
        .filter(SubjectColumn::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("批量查询科目失败: {e}")))?;

    Ok(subjects
        .into_iter()
        .map(|m| (m.id, m.into_subject()))
        .collect())
}

/// 统计班级在读学生数
pub(super) async fn count_enrolled<C: ConnectionTrait>(
    conn: &C,
    class_ids: &[i64],
) -> Result<HashMap<i64, i64>> {
    if class_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, i64)> = Enrollments::find()
        .select_only()
        .column(EnrollmentColumn::ClassId)
        .column_as(EnrollmentColumn::Id.count(), "student_count")
        .filter(EnrollmentColumn::ClassId.is_in(class_ids.to_vec()))
        .group_by(EnrollmentColumn::ClassId)
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("统计班级人数失败: {e}")))?;

    Ok(rows.into_iter().collect())
}

/// 从批量加载结果中取出关联实体，缺失时视为数据不一致
pub(super) fn take_related<T: Clone>(map: &HashMap<i64, T>, id: i64, label: &str) -> Result<T> {
    map.get(&id).cloned().ok_or_else(|| {
        EduPortalError::database_operation(format!("关联的{label}记录缺失: {id}"))
    })
}
