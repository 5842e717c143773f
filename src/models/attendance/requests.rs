use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use super::entities::AttendanceStatus;

// 单条考勤请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct MarkAttendanceRequest {
    pub student_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

// 班级批量考勤中的单个学生条目
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct StudentAttendanceEntry {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

// 班级批量考勤：同一班级、同一日期
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct ClassAttendanceRequest {
    pub class_id: i64,
    pub date: NaiveDate,
    pub records: Vec<StudentAttendanceEntry>,
}

impl ClassAttendanceRequest {
    /// 展开为逐条考勤请求，保持输入顺序
    pub fn into_requests(self) -> Vec<MarkAttendanceRequest> {
        let class_id = self.class_id;
        let date = self.date;
        self.records
            .into_iter()
            .map(|entry| MarkAttendanceRequest {
                student_id: entry.student_id,
                class_id,
                date,
                status: entry.status,
                notes: entry.notes,
            })
            .collect()
    }
}

// 按日期查询班级考勤
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/attendance.ts")]
pub struct ClassAttendanceQuery {
    pub date: NaiveDate,
}
