//! 考勤存储操作
//!
//! 以 (学生, 班级, 日期) 为自然键的查找或创建。插入在保存点内执行，
//! 唯一约束冲突时回滚到保存点并改为更新已存在的记录。

use chrono::NaiveDate;

use super::SeaOrmStorage;
use super::lookups::{
    find_user, is_unique_violation, load_classes, load_users, require_class, require_user,
    take_related,
};
use crate::entity::attendance::{ActiveModel, Column, Entity as Attendance, Model};
use crate::errors::{EduPortalError, Result};
use crate::models::attendance::{
    entities::{AttendanceDetail, AttendanceStats, AttendanceStatus},
    requests::{ClassAttendanceRequest, MarkAttendanceRequest},
};
use crate::models::classes::entities::Class;
use crate::models::users::entities::User;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, warn};

impl SeaOrmStorage {
    /// 单条考勤
    pub async fn mark_attendance_impl(
        &self,
        request: MarkAttendanceRequest,
        marked_by: i64,
    ) -> Result<AttendanceDetail> {
        let txn = self.begin_txn().await?;
        let marker = find_user(&txn, marked_by).await?;

        let detail = mark_in_txn(&txn, request, marked_by, marker.as_ref(), None).await?;

        commit_txn(txn).await?;
        Ok(detail)
    }

    /// 批量考勤（逐条独立请求），整体在一个事务中执行
    pub async fn mark_attendance_batch_impl(
        &self,
        requests: Vec<MarkAttendanceRequest>,
        marked_by: i64,
    ) -> Result<Vec<AttendanceDetail>> {
        let txn = self.begin_txn().await?;
        let marker = find_user(&txn, marked_by).await?;

        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            // 任一条失败时事务随 txn 丢弃而回滚
            results.push(mark_in_txn(&txn, request, marked_by, marker.as_ref(), None).await?);
        }

        commit_txn(txn).await?;
        debug!("批量考勤完成，共 {} 条", results.len());
        Ok(results)
    }

    /// 班级批量考勤（同一班级、同一日期），整体在一个事务中执行
    pub async fn mark_class_attendance_impl(
        &self,
        request: ClassAttendanceRequest,
        marked_by: i64,
    ) -> Result<Vec<AttendanceDetail>> {
        let txn = self.begin_txn().await?;
        let class = require_class(&txn, request.class_id).await?;
        let marker = find_user(&txn, marked_by).await?;

        let requests = request.into_requests();
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(mark_in_txn(&txn, request, marked_by, marker.as_ref(), Some(&class)).await?);
        }

        commit_txn(txn).await?;
        debug!(
            "班级 {} 批量考勤完成，共 {} 条",
            class.id,
            results.len()
        );
        Ok(results)
    }

    pub async fn delete_attendance_impl(&self, attendance_id: i64) -> Result<()> {
        let result = Attendance::delete_by_id(attendance_id)
            .exec(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("删除考勤记录失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(EduPortalError::not_found(format!(
                "Attendance record not found with id: {attendance_id}"
            )));
        }
        Ok(())
    }

    /// 学生考勤历史，日期倒序
    pub async fn list_student_attendance_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<AttendanceDetail>> {
        let rows = Attendance::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::Date)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询考勤记录失败: {e}")))?;

        enrich_attendance(&self.db, rows).await
    }

    /// 班级某日的全部考勤
    pub async fn list_class_attendance_impl(
        &self,
        class_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceDetail>> {
        let rows = Attendance::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::Date.eq(date))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询考勤记录失败: {e}")))?;

        enrich_attendance(&self.db, rows).await
    }

    /// 学生考勤统计
    pub async fn get_student_attendance_stats_impl(
        &self,
        student_id: i64,
    ) -> Result<AttendanceStats> {
        let total = Attendance::find()
            .filter(Column::StudentId.eq(student_id))
            .count(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("统计考勤记录失败: {e}")))?;

        let by_status: Vec<(String, i64)> = Attendance::find()
            .select_only()
            .column(Column::Status)
            .column_as(Column::Id.count(), "status_count")
            .filter(Column::StudentId.eq(student_id))
            .group_by(Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("统计考勤状态失败: {e}")))?;

        let count_of = |status: AttendanceStatus| {
            by_status
                .iter()
                .filter(|(s, _)| s.parse::<AttendanceStatus>().ok() == Some(status))
                .map(|(_, n)| *n)
                .sum::<i64>()
        };

        Ok(AttendanceStats::new(
            student_id,
            total as i64,
            count_of(AttendanceStatus::Present),
            count_of(AttendanceStatus::Absent),
            count_of(AttendanceStatus::Late),
            count_of(AttendanceStatus::Excused),
        ))
    }

    async fn begin_txn(&self) -> Result<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("开启事务失败: {e}")))
    }
}

async fn commit_txn(txn: DatabaseTransaction) -> Result<()> {
    txn.commit()
        .await
        .map_err(|e| EduPortalError::database_operation(format!("提交事务失败: {e}")))
}

/// 在事务内处理单条考勤：存在则更新，否则插入
///
/// `class` 为已解析的班级时跳过重复查询。
async fn mark_in_txn(
    txn: &DatabaseTransaction,
    request: MarkAttendanceRequest,
    marked_by: i64,
    marker: Option<&User>,
    class: Option<&Class>,
) -> Result<AttendanceDetail> {
    let student = require_user(txn, request.student_id, "Student").await?;
    let class = match class {
        Some(class) if class.id == request.class_id => class.clone(),
        _ => require_class(txn, request.class_id).await?,
    };

    let record = match find_by_key(txn, request.student_id, request.class_id, request.date).await? {
        Some(existing) => update_existing(txn, existing, &request, marked_by).await?,
        None => insert_or_update(txn, &request, marked_by).await?,
    };

    Ok(AttendanceDetail {
        record: record.into_attendance_record(),
        student,
        class,
        marked_by: marker.cloned(),
    })
}

async fn find_by_key<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
    class_id: i64,
    date: NaiveDate,
) -> Result<Option<Model>> {
    Attendance::find()
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::ClassId.eq(class_id))
        .filter(Column::Date.eq(date))
        .one(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("查询考勤记录失败: {e}")))
}

async fn update_existing<C: ConnectionTrait>(
    conn: &C,
    existing: Model,
    request: &MarkAttendanceRequest,
    marked_by: i64,
) -> Result<Model> {
    let mut model = existing.into_active_model();
    model.status = Set(request.status.to_string());
    model.notes = Set(request.notes.clone());
    model.marked_by = Set(Some(marked_by));
    model.updated_at = Set(chrono::Utc::now().timestamp());

    model
        .update(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("更新考勤记录失败: {e}")))
}

/// 在保存点内插入；若并发请求已先创建同键记录，则回滚保存点并改为更新
async fn insert_or_update(
    txn: &DatabaseTransaction,
    request: &MarkAttendanceRequest,
    marked_by: i64,
) -> Result<Model> {
    let now = chrono::Utc::now().timestamp();
    let model = ActiveModel {
        student_id: Set(request.student_id),
        class_id: Set(request.class_id),
        date: Set(request.date),
        status: Set(request.status.to_string()),
        notes: Set(request.notes.clone()),
        marked_by: Set(Some(marked_by)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let savepoint = txn
        .begin()
        .await
        .map_err(|e| EduPortalError::database_operation(format!("创建保存点失败: {e}")))?;

    match model.insert(&savepoint).await {
        Ok(inserted) => {
            savepoint
                .commit()
                .await
                .map_err(|e| EduPortalError::database_operation(format!("释放保存点失败: {e}")))?;
            Ok(inserted)
        }
        Err(e) if is_unique_violation(&e) => {
            savepoint
                .rollback()
                .await
                .map_err(|e| EduPortalError::database_operation(format!("回滚保存点失败: {e}")))?;
            warn!(
                "考勤记录插入冲突，改为更新: student={}, class={}, date={}",
                request.student_id, request.class_id, request.date
            );

            let existing = find_by_key(txn, request.student_id, request.class_id, request.date)
                .await?
                .ok_or_else(|| {
                    EduPortalError::database_operation("考勤记录冲突后重新读取失败")
                })?;
            update_existing(txn, existing, request, marked_by).await
        }
        Err(e) => Err(EduPortalError::database_operation(format!(
            "创建考勤记录失败: {e}"
        ))),
    }
}

/// 为考勤记录附加学生、班级与记录人
async fn enrich_attendance<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<Model>,
) -> Result<Vec<AttendanceDetail>> {
    let users = load_users(
        conn,
        rows.iter()
            .flat_map(|r| std::iter::once(r.student_id).chain(r.marked_by)),
    )
    .await?;
    let classes = load_classes(conn, rows.iter().map(|r| r.class_id)).await?;

    rows.into_iter()
        .map(|row| {
            Ok(AttendanceDetail {
                student: take_related(&users, row.student_id, "学生")?,
                class: take_related(&classes, row.class_id, "班级")?,
                marked_by: row.marked_by.and_then(|id| users.get(&id).cloned()),
                record: row.into_attendance_record(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_class, create_user, date, memory_storage};
    use crate::entity::attendance::Entity as Attendance;
    use crate::models::attendance::{
        entities::AttendanceStatus,
        requests::{ClassAttendanceRequest, MarkAttendanceRequest, StudentAttendanceEntry},
    };
    use crate::models::users::entities::UserRole;
    use sea_orm::{EntityTrait, PaginatorTrait};

    fn mark(student_id: i64, class_id: i64, status: AttendanceStatus) -> MarkAttendanceRequest {
        MarkAttendanceRequest {
            student_id,
            class_id,
            date: date(2024, 9, 1),
            status,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_insert_conflict_falls_back_to_update() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let other = create_user(&storage, "o@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;

        // 另一请求已先写入同一自然键
        storage
            .mark_attendance_impl(mark(student.id, class.id, AttendanceStatus::Present), teacher.id)
            .await
            .unwrap();

        // 跳过查找直接插入，命中唯一约束后应回滚保存点并更新
        let txn = storage.begin_txn().await.unwrap();
        let record = super::insert_or_update(
            &txn,
            &mark(student.id, class.id, AttendanceStatus::Absent),
            other.id,
        )
        .await
        .unwrap();
        super::commit_txn(txn).await.unwrap();

        assert_eq!(record.status, "absent");
        assert_eq!(record.marked_by, Some(other.id));

        let rows = Attendance::find().all(&storage.db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, record.id);
        assert_eq!(rows[0].status, "absent");
    }

    #[tokio::test]
    async fn test_remark_same_day_updates_in_place() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;
        storage.enroll_student_impl(student.id, class.id).await.unwrap();

        let first = storage
            .mark_attendance_impl(mark(student.id, class.id, AttendanceStatus::Present), teacher.id)
            .await
            .unwrap();
        let stats = storage
            .get_student_attendance_stats_impl(student.id)
            .await
            .unwrap();
        assert_eq!((stats.total, stats.present), (1, 1));
        assert_eq!(stats.attendance_percentage, 100.0);

        let second = storage
            .mark_attendance_impl(mark(student.id, class.id, AttendanceStatus::Absent), teacher.id)
            .await
            .unwrap();
        assert_eq!(first.record.id, second.record.id);
        assert_eq!(second.record.status, AttendanceStatus::Absent);
        assert_eq!(second.marked_by.map(|u| u.id), Some(teacher.id));

        let stats = storage
            .get_student_attendance_stats_impl(student.id)
            .await
            .unwrap();
        assert_eq!((stats.total, stats.present, stats.absent), (1, 0, 1));
        assert_eq!(stats.attendance_percentage, 0.0);
        assert_eq!(Attendance::find().count(&storage.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_student_or_class() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;

        let err = storage
            .mark_attendance_impl(mark(999, class.id, AttendanceStatus::Present), teacher.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");

        let err = storage
            .mark_attendance_impl(mark(student.id, 999, AttendanceStatus::Present), teacher.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[tokio::test]
    async fn test_class_bulk_with_missing_student_writes_nothing() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let a = create_user(&storage, "a@school.test", UserRole::Student).await;
        let b = create_user(&storage, "b@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;

        let entry = |student_id| StudentAttendanceEntry {
            student_id,
            status: AttendanceStatus::Present,
            notes: None,
        };
        let err = storage
            .mark_class_attendance_impl(
                ClassAttendanceRequest {
                    class_id: class.id,
                    date: date(2024, 9, 2),
                    records: vec![entry(a.id), entry(b.id), entry(4040)],
                },
                teacher.id,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");
        assert_eq!(Attendance::find().count(&storage.db).await.unwrap(), 0);

        let ok = storage
            .mark_class_attendance_impl(
                ClassAttendanceRequest {
                    class_id: class.id,
                    date: date(2024, 9, 2),
                    records: vec![entry(b.id), entry(a.id)],
                },
                teacher.id,
            )
            .await
            .unwrap();
        let order: Vec<_> = ok.iter().map(|d| d.student.id).collect();
        assert_eq!(order, vec![b.id, a.id]);
        assert_eq!(
            storage
                .list_class_attendance_impl(class.id, date(2024, 9, 2))
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_list_batch_is_atomic_and_ordered() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;

        let mut late = mark(student.id, class.id, AttendanceStatus::Late);
        late.date = date(2024, 9, 3);
        let err = storage
            .mark_attendance_batch_impl(
                vec![
                    mark(student.id, class.id, AttendanceStatus::Present),
                    late.clone(),
                    mark(8080, class.id, AttendanceStatus::Present),
                ],
                teacher.id,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");
        assert_eq!(Attendance::find().count(&storage.db).await.unwrap(), 0);

        // 同一批次内重复键收敛为一条
        let results = storage
            .mark_attendance_batch_impl(
                vec![
                    mark(student.id, class.id, AttendanceStatus::Present),
                    late,
                    mark(student.id, class.id, AttendanceStatus::Excused),
                ],
                teacher.id,
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].record.id, results[2].record.id);

        let history = storage
            .list_student_attendance_impl(student.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].record.date, date(2024, 9, 3));
        assert_eq!(history[1].record.status, AttendanceStatus::Excused);

        let stats = storage
            .get_student_attendance_stats_impl(student.id)
            .await
            .unwrap();
        assert_eq!(
            stats.present + stats.absent + stats.late + stats.excused,
            stats.total
        );
        assert_eq!(stats.attendance_percentage, 50.0);
    }

    #[tokio::test]
    async fn test_stats_without_records_and_delete() {
        let storage = memory_storage().await;
        let stats = storage.get_student_attendance_stats_impl(1).await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.attendance_percentage, 0.0);

        let err = storage.delete_attendance_impl(1).await.unwrap_err();
        assert_eq!(err.code(), "E005");
    }
}
