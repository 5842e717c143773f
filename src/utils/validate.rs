use once_cell::sync::Lazy;
use regex::Regex;

use super::decimal::score_from_f64;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

/// 常见弱密码，忽略大小写比较
const WEAK_PASSWORDS: [&str; 7] = [
    "password1",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "abcd1234",
    "welcome1",
];

fn long_enough(p: &str) -> bool {
    p.chars().count() >= 8
}

fn has_uppercase(p: &str) -> bool {
    p.chars().any(|c| c.is_ascii_uppercase())
}

fn has_lowercase(p: &str) -> bool {
    p.chars().any(|c| c.is_ascii_lowercase())
}

fn has_digit(p: &str) -> bool {
    p.chars().any(|c| c.is_ascii_digit())
}

/// 密码规则：(是否满足, 不满足时的提示)
const PASSWORD_RULES: [(fn(&str) -> bool, &str); 4] = [
    (long_enough, "Password must be at least 8 characters long"),
    (has_uppercase, "Password must contain at least one uppercase letter"),
    (has_lowercase, "Password must contain at least one lowercase letter"),
    (has_digit, "Password must contain at least one digit"),
];

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 非空白字段校验（姓名、班级名、考试类型等）
pub fn validate_non_blank(value: &str, field: &'static str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be blank"));
    }
    Ok(())
}

/// 分数须能存入 DECIMAL(10, 2)
pub fn validate_score(score: f64) -> Result<(), &'static str> {
    score_from_f64(score)
        .map(|_| ())
        .ok_or("score must be a finite number with magnitude below 100000000")
}

/// 满分按两位小数舍入后必须非零，否则百分比无意义
pub fn validate_max_score(max_score: Option<f64>) -> Result<(), &'static str> {
    match max_score.map(score_from_f64) {
        Some(None) => Err("max_score must be a finite number with magnitude below 100000000"),
        Some(Some(v)) if v.is_zero() => Err("max_score must be a non-zero number"),
        _ => Ok(()),
    }
}

/// 密码策略：至少 8 位，包含大小写字母与数字，且不是常见弱密码
///
/// 返回全部未满足的规则，以 `; ` 连接。
pub fn validate_password(password: &str) -> Result<(), String> {
    let mut errors: Vec<&str> = PASSWORD_RULES
        .iter()
        .filter(|(check, _)| !check(password))
        .map(|(_, message)| *message)
        .collect();

    if WEAK_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(validate_email("alice@school.edu").is_ok());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_non_blank() {
        assert!(validate_non_blank("Midterm", "exam_type").is_ok());
        assert_eq!(
            validate_non_blank("   ", "exam_type").unwrap_err(),
            "exam_type must not be blank"
        );
    }

    #[test]
    fn test_max_score() {
        assert!(validate_max_score(None).is_ok());
        assert!(validate_max_score(Some(50.0)).is_ok());
        assert!(validate_max_score(Some(-20.0)).is_ok());
        assert!(validate_max_score(Some(0.0)).is_err());
        assert!(validate_max_score(Some(f64::NAN)).is_err());
        assert!(validate_max_score(Some(0.004)).is_err());
        assert!(validate_max_score(Some(0.005)).is_ok());
        assert!(validate_score(99_999_999.99).is_ok());
        assert!(validate_score(1e9).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(validate_password("Gradebook2025").is_ok());

        let err = validate_password("ab1").unwrap_err();
        assert!(err.contains("at least 8 characters"));
        assert!(err.contains("uppercase"));

        let err = validate_password("ABCDEFGH").unwrap_err();
        assert!(err.contains("lowercase"));
        assert!(err.contains("digit"));
    }

    #[test]
    fn test_common_password_rejected() {
        let err = validate_password("Password1").unwrap_err();
        assert_eq!(
            err,
            "Password is too common, please choose a stronger password"
        );
    }
}
