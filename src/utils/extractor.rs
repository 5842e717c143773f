//! 安全的路径参数提取器
//!
//! 路径中的 ID 解析失败或不为正数时直接返回 400 与统一响应体，
//! 避免 actix 默认的纯文本错误。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError, http::StatusCode,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path_param(message: String) -> actix_web::Error {
    let response = HttpResponse::build(StatusCode::BAD_REQUEST)
        .json(ApiResponse::<()>::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

fn parse_positive_i64(req: &HttpRequest, param: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(param)
        .ok_or_else(|| bad_path_param(format!("Missing path parameter: {param}")))?;

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_path_param(format!("Invalid {param}: {raw}"))),
    }
}

macro_rules! define_safe_i64_extractor {
    ($($name:ident => $param:literal),+ $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_positive_i64(req, $param).map($name))
                }
            }
        )+
    };
}

define_safe_i64_extractor! {
    SafeIDI64 => "id",
    SafeStudentIdI64 => "student_id",
    SafeClassIdI64 => "class_id",
    SafeSubjectIdI64 => "subject_id",
    SafeTeacherIdI64 => "teacher_id",
}

/// `/student/{student_id}/class/{class_id}` 形式的复合路径
#[derive(Debug, Clone, Copy)]
pub struct SafeStudentClassPath {
    pub student_id: i64,
    pub class_id: i64,
}

impl FromRequest for SafeStudentClassPath {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::parse(req))
    }
}

impl SafeStudentClassPath {
    fn parse(req: &HttpRequest) -> Result<Self, actix_web::Error> {
        Ok(Self {
            student_id: parse_positive_i64(req, "student_id")?,
            class_id: parse_positive_i64(req, "class_id")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_valid_id() {
        let req = TestRequest::default()
            .param("class_id", "42")
            .to_http_request();
        let extracted = SafeClassIdI64::extract(&req).await.unwrap();
        assert_eq!(extracted.0, 42);
    }

    #[actix_web::test]
    async fn test_rejects_non_positive_and_garbage() {
        for raw in ["0", "-3", "abc", "1.5"] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            let err = SafeIDI64::extract(&req).await.unwrap_err();
            assert_eq!(
                err.as_response_error().status_code(),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[actix_web::test]
    async fn test_compound_path() {
        let req = TestRequest::default()
            .param("student_id", "7")
            .param("class_id", "9")
            .to_http_request();
        let path = SafeStudentClassPath::extract(&req).await.unwrap();
        assert_eq!((path.student_id, path.class_id), (7, 9));
    }
}
