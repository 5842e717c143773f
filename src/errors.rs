//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 唯一约束冲突统一映射为 `Conflict`，其余数据库错误映射为 `DatabaseOperation`。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_eduportal_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum EduPortalError {
            $($variant(String),)*
        }

        impl EduPortalError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(EduPortalError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(EduPortalError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(EduPortalError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl EduPortalError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        EduPortalError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_eduportal_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    Validation("E004", "Validation Error"),
    NotFound("E005", "Resource Not Found"),
    Conflict("E006", "Resource Conflict"),
    Authentication("E007", "Authentication Error"),
}

impl fmt::Display for EduPortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for EduPortalError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for EduPortalError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => EduPortalError::Conflict(msg),
            _ => EduPortalError::DatabaseOperation(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, EduPortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(EduPortalError::database_config("test").code(), "E001");
        assert_eq!(EduPortalError::validation("test").code(), "E004");
        assert_eq!(EduPortalError::not_found("test").code(), "E005");
        assert_eq!(EduPortalError::conflict("test").code(), "E006");
        assert_eq!(EduPortalError::authentication("test").code(), "E007");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            EduPortalError::conflict("test").error_type(),
            "Resource Conflict"
        );
        assert_eq!(
            EduPortalError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = EduPortalError::not_found("Student not found with id: 7");
        assert_eq!(err.message(), "Student not found with id: 7");
    }

    #[test]
    fn test_display() {
        let err = EduPortalError::conflict("Student already enrolled");
        let formatted = err.to_string();
        assert!(formatted.contains("Resource Conflict"));
        assert!(formatted.contains("Student already enrolled"));
    }

    #[test]
    fn test_generic_db_error_maps_to_operation() {
        let err: EduPortalError = sea_orm::DbErr::Custom("boom".into()).into();
        assert_eq!(err.code(), "E003");
    }
}
