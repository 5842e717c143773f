//! 成绩存储操作
//!
//! 成绩只追加不按自然键合并；批量新增逐条独立提交。

use super::SeaOrmStorage;
use super::lookups::{
    find_user, load_classes, load_subjects, load_users, require_class, require_subject,
    require_user, take_related,
};
use crate::entity::marks::{ActiveModel, Column, Entity as Marks, Model};
use crate::errors::{EduPortalError, Result};
use crate::models::marks::{
    entities::{DEFAULT_MAX_SCORE, MarkDetail},
    requests::{AddMarkRequest, UpdateMarkRequest},
};
use crate::utils::decimal::{round_half_up, score_from_f64, to_f64};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::debug;

impl SeaOrmStorage {
    /// 新增成绩，总是插入新记录
    pub async fn add_mark_impl(&self, req: AddMarkRequest, graded_by: i64) -> Result<MarkDetail> {
        let score = score_value(req.score, "score")?;
        let max_score = max_score_value(req.max_score)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("开启事务失败: {e}")))?;

        let student = require_user(&txn, req.student_id, "Student").await?;
        let class = require_class(&txn, req.class_id).await?;
        let subject = require_subject(&txn, req.subject_id).await?;
        let grader = find_user(&txn, graded_by).await?;

        let now = chrono::Utc::now();
        let model = ActiveModel {
            student_id: Set(req.student_id),
            class_id: Set(req.class_id),
            subject_id: Set(req.subject_id),
            exam_type: Set(req.exam_type),
            score: Set(score),
            max_score: Set(max_score),
            exam_date: Set(req.exam_date.unwrap_or_else(|| now.date_naive())),
            notes: Set(req.notes),
            graded_by: Set(Some(graded_by)),
            created_at: Set(now.timestamp()),
            updated_at: Set(now.timestamp()),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("创建成绩记录失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(MarkDetail {
            mark: inserted.into_mark(),
            student,
            class,
            subject,
            graded_by: grader,
        })
    }

    /// 批量新增成绩：逐条调用 add_mark，遇错即停，已写入的记录保留
    pub async fn add_marks_impl(
        &self,
        requests: Vec<AddMarkRequest>,
        graded_by: i64,
    ) -> Result<Vec<MarkDetail>> {
        let mut results = Vec::with_capacity(requests.len());
        for req in requests {
            results.push(self.add_mark_impl(req, graded_by).await?);
        }
        debug!("批量新增成绩完成，共 {} 条", results.len());
        Ok(results)
    }

    /// 更新成绩
    pub async fn update_mark_impl(
        &self,
        mark_id: i64,
        update: UpdateMarkRequest,
        graded_by: i64,
    ) -> Result<MarkDetail> {
        let score = score_value(update.score, "score")?;
        let max_score = update.max_score.map(|v| max_score_value(Some(v))).transpose()?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("开启事务失败: {e}")))?;

        let existing = Marks::find_by_id(mark_id)
            .one(&txn)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询成绩记录失败: {e}")))?
            .ok_or_else(|| EduPortalError::not_found(format!("Mark not found with id: {mark_id}")))?;

        let mut model = existing.into_active_model();
        model.exam_type = Set(update.exam_type);
        model.score = Set(score);
        model.graded_by = Set(Some(graded_by));
        if let Some(max_score) = max_score {
            model.max_score = Set(max_score);
        }
        if let Some(exam_date) = update.exam_date {
            model.exam_date = Set(exam_date);
        }
        if let Some(notes) = update.notes {
            model.notes = Set(Some(notes));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&txn)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("更新成绩记录失败: {e}")))?;

        let mut details = enrich_marks(&txn, vec![updated]).await?;
        txn.commit()
            .await
            .map_err(|e| EduPortalError::database_operation(format!("提交事务失败: {e}")))?;

        details
            .pop()
            .ok_or_else(|| EduPortalError::database_operation("更新后的成绩记录缺失"))
    }

    pub async fn delete_mark_impl(&self, mark_id: i64) -> Result<()> {
        let result = Marks::delete_by_id(mark_id)
            .exec(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("删除成绩记录失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(EduPortalError::not_found(format!(
                "Mark not found with id: {mark_id}"
            )));
        }
        Ok(())
    }

    /// 学生成绩历史，考试日期倒序
    pub async fn list_student_marks_impl(&self, student_id: i64) -> Result<Vec<MarkDetail>> {
        let rows = Marks::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::ExamDate)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询成绩记录失败: {e}")))?;

        enrich_marks(&self.db, rows).await
    }

    pub async fn list_class_subject_marks_impl(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<MarkDetail>> {
        let rows = Marks::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::SubjectId.eq(subject_id))
            .order_by_desc(Column::ExamDate)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduPortalError::database_operation(format!("查询成绩记录失败: {e}")))?;

        enrich_marks(&self.db, rows).await
    }

    /// 学生平均百分比，无成绩时为 None
    pub async fn get_student_average_impl(&self, student_id: i64) -> Result<Option<f64>> {
        average_percentage(
            &self.db,
            Marks::find().filter(Column::StudentId.eq(student_id)),
        )
        .await
    }

    /// 班级某科目的平均百分比，无成绩时为 None
    pub async fn get_class_subject_average_impl(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Option<f64>> {
        average_percentage(
            &self.db,
            Marks::find()
                .filter(Column::ClassId.eq(class_id))
                .filter(Column::SubjectId.eq(subject_id)),
        )
        .await
    }
}

/// 请求中的分数转为 DECIMAL(10, 2) 列值
fn score_value(value: f64, field: &str) -> Result<Decimal> {
    score_from_f64(value).ok_or_else(|| {
        EduPortalError::validation(format!(
            "{field} must be a finite number with magnitude below 100000000"
        ))
    })
}

/// 未提供时取默认满分；舍入到两位小数后为 0 视为无效
fn max_score_value(value: Option<f64>) -> Result<Decimal> {
    let Some(value) = value else {
        return Ok(DEFAULT_MAX_SCORE);
    };
    let max_score = score_value(value, "max_score")?;
    if max_score.is_zero() {
        return Err(EduPortalError::validation("max_score must not be zero"));
    }
    Ok(max_score)
}

/// 每条记录 score / max_score * 100 的均值（不做舍入）
async fn average_percentage<C: ConnectionTrait>(
    conn: &C,
    select: Select<Marks>,
) -> Result<Option<f64>> {
    let scores: Vec<(Decimal, Decimal)> = select
        .select_only()
        .column(Column::Score)
        .column(Column::MaxScore)
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| EduPortalError::database_operation(format!("查询成绩失败: {e}")))?;

    if scores.is_empty() {
        return Ok(None);
    }

    let sum = scores
        .iter()
        .try_fold(Decimal::ZERO, |acc, (score, max_score)| {
            round_half_up(*score, 2)
                .checked_div(round_half_up(*max_score, 2))?
                .checked_mul(Decimal::ONE_HUNDRED)
                .and_then(|pct| acc.checked_add(pct))
        })
        .ok_or_else(|| EduPortalError::database_operation("成绩平均值计算溢出"))?;

    Ok(Some(to_f64(sum / Decimal::from(scores.len() as i64))))
}

/// 为成绩记录附加学生、班级、科目与评分人
async fn enrich_marks<C: ConnectionTrait>(conn: &C, rows: Vec<Model>) -> Result<Vec<MarkDetail>> {
    let users = load_users(
        conn,
        rows.iter()
            .flat_map(|r| std::iter::once(r.student_id).chain(r.graded_by)),
    )
    .await?;
    let classes = load_classes(conn, rows.iter().map(|r| r.class_id)).await?;
    let subjects = load_subjects(conn, rows.iter().map(|r| r.subject_id)).await?;

    rows.into_iter()
        .map(|row| {
            Ok(MarkDetail {
                student: take_related(&users, row.student_id, "学生")?,
                class: take_related(&classes, row.class_id, "班级")?,
                subject: take_related(&subjects, row.subject_id, "科目")?,
                graded_by: row.graded_by.and_then(|id| users.get(&id).cloned()),
                mark: row.into_mark(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{
        create_class, create_subject, create_user, date, memory_storage,
    };
    use crate::models::marks::requests::{AddMarkRequest, UpdateMarkRequest};
    use crate::models::users::entities::UserRole;
    use rust_decimal::Decimal;

    fn add(student_id: i64, class_id: i64, subject_id: i64, score: f64) -> AddMarkRequest {
        AddMarkRequest {
            student_id,
            class_id,
            subject_id,
            exam_type: "Quiz".to_string(),
            score,
            max_score: Some(50.0),
            exam_date: Some(date(2024, 10, 1)),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_add_mark_derives_percentage_and_grade() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;
        let math = create_subject(&storage, "Math").await;

        let detail = storage
            .add_mark_impl(add(student.id, class.id, math.id, 42.0), teacher.id)
            .await
            .unwrap();
        assert_eq!(detail.mark.percentage(), 84.0);
        assert_eq!(detail.mark.grade(), "A-");
        assert_eq!(detail.subject.name, "Math");

        // 相同键再次新增产生第二条记录
        storage
            .add_mark_impl(add(student.id, class.id, math.id, 42.0), teacher.id)
            .await
            .unwrap();
        assert_eq!(storage.list_student_marks_impl(student.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_scores_stored_at_two_decimals() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;
        let math = create_subject(&storage, "Math").await;

        // 0.46 / 80 = 0.575%，中点向上
        let mut req = add(student.id, class.id, math.id, 0.46);
        req.max_score = Some(80.0);
        let created = storage.add_mark_impl(req, teacher.id).await.unwrap();
        assert_eq!(created.mark.score, Decimal::new(46, 2));
        assert_eq!(created.mark.percentage(), 0.58);

        // 89.996 存为 90.00
        let mut req = add(student.id, class.id, math.id, 89.996);
        req.max_score = None;
        storage.add_mark_impl(req, teacher.id).await.unwrap();

        let marks = storage.list_student_marks_impl(student.id).await.unwrap();
        let scores: Vec<Decimal> = marks.iter().map(|m| m.mark.score).collect();
        assert!(scores.contains(&Decimal::new(46, 2)));
        assert!(scores.contains(&Decimal::from(90)));
        let reloaded = marks
            .iter()
            .find(|m| m.mark.score == Decimal::new(46, 2))
            .unwrap();
        assert_eq!(reloaded.mark.percentage(), 0.58);

        // 舍入后为 0 的满分在写入前被拒绝
        let mut req = add(student.id, class.id, math.id, 1.0);
        req.max_score = Some(0.001);
        let err = storage.add_mark_impl(req, teacher.id).await.unwrap_err();
        assert_eq!(err.code(), "E004");
        assert_eq!(storage.list_student_marks_impl(student.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_defaults_when_optional_fields_missing() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;
        let math = create_subject(&storage, "Math").await;

        let mut req = add(student.id, class.id, math.id, 90.0);
        req.max_score = None;
        req.exam_date = None;
        let detail = storage.add_mark_impl(req, teacher.id).await.unwrap();
        assert_eq!(detail.mark.max_score, Decimal::ONE_HUNDRED);
        assert_eq!(detail.mark.exam_date, chrono::Utc::now().date_naive());
        assert_eq!(detail.mark.grade(), "A+");
    }

    #[tokio::test]
    async fn test_bulk_add_keeps_rows_before_failure() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;
        let math = create_subject(&storage, "Math").await;

        let err = storage
            .add_marks_impl(
                vec![
                    add(student.id, class.id, math.id, 40.0),
                    add(student.id, class.id, 9999, 45.0),
                    add(student.id, class.id, math.id, 50.0),
                ],
                teacher.id,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");

        let marks = storage.list_student_marks_impl(student.id).await.unwrap();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].mark.score, Decimal::from(40));
    }

    #[tokio::test]
    async fn test_update_overwrites_only_present_fields() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let other = create_user(&storage, "o@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;
        let math = create_subject(&storage, "Math").await;

        let mut req = add(student.id, class.id, math.id, 30.0);
        req.notes = Some("retake".to_string());
        let created = storage.add_mark_impl(req, teacher.id).await.unwrap();

        let updated = storage
            .update_mark_impl(
                created.mark.id,
                UpdateMarkRequest {
                    exam_type: "Midterm".to_string(),
                    score: 45.0,
                    max_score: None,
                    exam_date: None,
                    notes: None,
                },
                other.id,
            )
            .await
            .unwrap();
        assert_eq!(updated.mark.exam_type, "Midterm");
        assert_eq!(updated.mark.score, Decimal::from(45));
        assert_eq!(updated.mark.max_score, Decimal::from(50));
        assert_eq!(updated.mark.exam_date, date(2024, 10, 1));
        assert_eq!(updated.mark.notes.as_deref(), Some("retake"));
        assert_eq!(updated.graded_by.map(|u| u.id), Some(other.id));

        let err = storage
            .update_mark_impl(
                777,
                UpdateMarkRequest {
                    exam_type: "Final".to_string(),
                    score: 1.0,
                    max_score: None,
                    exam_date: None,
                    notes: None,
                },
                other.id,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[tokio::test]
    async fn test_averages() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@school.test", UserRole::Teacher).await;
        let student = create_user(&storage, "s@school.test", UserRole::Student).await;
        let class = create_class(&storage, "5A").await;
        let math = create_subject(&storage, "Math").await;

        assert_eq!(storage.get_student_average_impl(student.id).await.unwrap(), None);
        assert_eq!(
            storage
                .get_class_subject_average_impl(class.id, math.id)
                .await
                .unwrap(),
            None
        );

        // 40/50 = 80%，30/50 = 60%
        storage
            .add_marks_impl(
                vec![
                    add(student.id, class.id, math.id, 40.0),
                    add(student.id, class.id, math.id, 30.0),
                ],
                teacher.id,
            )
            .await
            .unwrap();

        assert_eq!(
            storage.get_student_average_impl(student.id).await.unwrap(),
            Some(70.0)
        );
        assert_eq!(
            storage
                .get_class_subject_average_impl(class.id, math.id)
                .await
                .unwrap(),
            Some(70.0)
        );
    }
}
