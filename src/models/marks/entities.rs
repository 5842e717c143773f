use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::classes::entities::Class;
use crate::models::subjects::entities::Subject;
use crate::models::users::entities::User;
use crate::utils::decimal::{round_half_up, to_f64};

/// 未指定满分时的默认满分
pub const DEFAULT_MAX_SCORE: Decimal = Decimal::ONE_HUNDRED;

/// 等级划分，按阈值从高到低，首个满足的生效
const GRADE_BANDS: [(f64, &str); 10] = [
    (90.0, "A+"),
    (85.0, "A"),
    (80.0, "A-"),
    (75.0, "B+"),
    (70.0, "B"),
    (65.0, "B-"),
    (60.0, "C+"),
    (55.0, "C"),
    (50.0, "C-"),
    (45.0, "D"),
];

// 成绩记录，只追加，不按自然键去重
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct MarkRecord {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub exam_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub score: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub max_score: Decimal,
    pub exam_date: NaiveDate,
    pub notes: Option<String>,
    pub graded_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl MarkRecord {
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.max_score)
    }

    pub fn grade(&self) -> &'static str {
        letter_grade(self.percentage())
    }
}

/// 存储层返回的成绩记录及其关联实体
#[derive(Debug, Clone)]
pub struct MarkDetail {
    pub mark: MarkRecord,
    pub student: User,
    pub class: Class,
    pub subject: Subject,
    pub graded_by: Option<User>,
}

/// score / max_score 先在十进制下四舍五入到 4 位，再乘 100，即两位小数的百分比
///
/// 不对分数做范围校验，超出 [0, max_score] 的分数会得到 [0, 100] 之外的百分比。
/// 满分为 0 在写入前已被拒绝，这里按 0 处理。
pub fn percentage(score: Decimal, max_score: Decimal) -> f64 {
    let ratio = score.checked_div(max_score).unwrap_or(Decimal::ZERO);
    to_f64(round_half_up(ratio, 4) * Decimal::ONE_HUNDRED)
}

pub fn letter_grade(percentage: f64) -> &'static str {
    GRADE_BANDS
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or("F")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(score: &str, max_score: &str) -> f64 {
        percentage(score.parse().unwrap(), max_score.parse().unwrap())
    }

    #[test]
    fn test_percentage() {
        assert_eq!(pct("42", "50"), 84.0);
        assert_eq!(pct("90", "100"), 90.0);
        assert_eq!(pct("2", "3"), 66.67);
        assert_eq!(pct("1", "8"), 12.5);
    }

    #[test]
    fn test_percentage_rounds_midpoints_up() {
        // 0.575% 与 0.145% 恰为中点，二进制浮点会向下舍入
        assert_eq!(pct("0.46", "80"), 0.58);
        assert_eq!(pct("0.29", "200"), 0.15);
        assert_eq!(pct("1.01", "40"), 2.53);
        assert_eq!(pct("-0.46", "80"), -0.58);
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(letter_grade(90.0), "A+");
        assert_eq!(letter_grade(89.99), "A");
        assert_eq!(letter_grade(85.0), "A");
        assert_eq!(letter_grade(84.0), "A-");
        assert_eq!(letter_grade(80.0), "A-");
        assert_eq!(letter_grade(75.0), "B+");
        assert_eq!(letter_grade(70.0), "B");
        assert_eq!(letter_grade(65.0), "B-");
        assert_eq!(letter_grade(60.0), "C+");
        assert_eq!(letter_grade(55.0), "C");
        assert_eq!(letter_grade(50.0), "C-");
        assert_eq!(letter_grade(45.0), "D");
        assert_eq!(letter_grade(44.99), "F");
        assert_eq!(letter_grade(0.0), "F");
    }

    #[test]
    fn test_out_of_range_scores_are_not_clamped() {
        assert_eq!(pct("120", "100"), 120.0);
        assert_eq!(letter_grade(pct("120", "100")), "A+");
        assert_eq!(pct("-5", "50"), -10.0);
        assert_eq!(letter_grade(-10.0), "F");
    }

    #[test]
    fn test_grade_uses_rounded_percentage() {
        // 179.99 / 200 = 0.89995，舍入后为 90.00
        assert_eq!(pct("179.99", "200"), 90.0);
        assert_eq!(letter_grade(pct("179.99", "200")), "A+");
    }
}
