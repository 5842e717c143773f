use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::classes::entities::Class;
use crate::models::users::entities::User;
use crate::utils::decimal::{round_half_up, to_f64};

// 考勤状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub enum AttendanceStatus {
    Present, // 出勤
    Absent,  // 缺勤
    Late,    // 迟到（计入出勤率）
    Excused, // 请假
}

impl AttendanceStatus {
    pub const PRESENT: &'static str = "present";
    pub const ABSENT: &'static str = "absent";
    pub const LATE: &'static str = "late";
    pub const EXCUSED: &'static str = "excused";

    pub fn all() -> [AttendanceStatus; 4] {
        [Self::Present, Self::Absent, Self::Late, Self::Excused]
    }
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<AttendanceStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的考勤状态: '{s}'. 支持的状态: present, absent, late, excused"
            ))
        })
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttendanceStatus::Present => Self::PRESENT,
            AttendanceStatus::Absent => Self::ABSENT,
            AttendanceStatus::Late => Self::LATE,
            AttendanceStatus::Excused => Self::EXCUSED,
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            Self::PRESENT => Ok(AttendanceStatus::Present),
            Self::ABSENT => Ok(AttendanceStatus::Absent),
            Self::LATE => Ok(AttendanceStatus::Late),
            Self::EXCUSED => Ok(AttendanceStatus::Excused),
            _ => Err(format!("Invalid attendance status: {s}")),
        }
    }
}

// 考勤记录，(student_id, class_id, date) 唯一
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub marked_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 存储层返回的考勤记录及其关联实体
#[derive(Debug, Clone)]
pub struct AttendanceDetail {
    pub record: AttendanceRecord,
    pub student: User,
    pub class: Class,
    pub marked_by: Option<User>,
}

// 单个学生的考勤统计
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct AttendanceStats {
    pub student_id: i64,
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
    pub excused: i64,
    /// (present + late) / total * 100，保留两位小数；无记录时为 0
    pub attendance_percentage: f64,
}

impl AttendanceStats {
    pub fn new(student_id: i64, total: i64, present: i64, absent: i64, late: i64, excused: i64) -> Self {
        Self {
            student_id,
            total,
            present,
            absent,
            late,
            excused,
            attendance_percentage: attendance_percentage(present, late, total),
        }
    }
}

/// 出勤率，迟到计入出勤
pub fn attendance_percentage(present: i64, late: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = Decimal::from(present + late) * Decimal::ONE_HUNDRED / Decimal::from(total);
    to_f64(round_half_up(ratio, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_counts_late_as_present() {
        assert_eq!(attendance_percentage(2, 1, 4), 75.0);
        assert_eq!(attendance_percentage(1, 0, 1), 100.0);
        assert_eq!(attendance_percentage(0, 0, 1), 0.0);
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(attendance_percentage(0, 0, 0), 0.0);
        assert_eq!(AttendanceStats::new(1, 0, 0, 0, 0, 0).attendance_percentage, 0.0);
    }

    #[test]
    fn test_percentage_rounding() {
        // 2/3 = 66.666...
        assert_eq!(attendance_percentage(2, 0, 3), 66.67);
        // 1/3 = 33.333...
        assert_eq!(attendance_percentage(0, 1, 3), 33.33);
        // 29/20000 = 0.145%，中点向上
        assert_eq!(attendance_percentage(29, 0, 20000), 0.15);
        assert_eq!(attendance_percentage(1, 0, 8), 12.5);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Late".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Late));
        assert_eq!(AttendanceStatus::Excused.to_string(), "excused");
        assert!("sick".parse::<AttendanceStatus>().is_err());
        assert!(serde_json::from_str::<AttendanceStatus>("\"holiday\"").is_err());
    }
}
