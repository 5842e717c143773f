pub mod attendance;
pub mod auth;
pub mod classes;
pub mod common;
pub mod dashboard;
pub mod enrollments;
pub mod marks;
pub mod subjects;
pub mod teaching_assignments;
pub mod users;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证与用户
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNotFound = 2004,
    UserEmailAlreadyExists = 2009,
    UserEmailInvalid = 2010,
    UserPasswordInvalid = 2011,
    UserNameInvalid = 2012,
    UserUpdateFailed = 2013,
    UserDeleteFailed = 2014,
    AdminAlreadyExists = 2015,
    UserInactive = 2016,

    // 班级与科目
    ClassNotFound = 3004,
    ClassAlreadyExists = 3009,
    ClassCreationFailed = 3010,
    ClassUpdateFailed = 3011,
    ClassDeleteFailed = 3012,
    SubjectNotFound = 3104,
    SubjectAlreadyExists = 3109,
    SubjectCreationFailed = 3110,
    SubjectUpdateFailed = 3111,
    SubjectDeleteFailed = 3112,

    // 花名册
    EnrollmentNotFound = 4004,
    EnrollmentAlreadyExists = 4009,
    AssignmentNotFound = 4104,
    AssignmentAlreadyExists = 4109,

    // 考勤与成绩
    AttendanceNotFound = 5004,
    AttendanceInvalid = 5010,
    MarkNotFound = 6004,
    MarkInvalid = 6010,
}
