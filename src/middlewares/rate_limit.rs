/*!
 * 速率限制中间件
 *
 * 此中间件用于限制请求频率，防止暴力破解和 DDoS 攻击。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::rate_limit::RateLimit;
 *
 * App::new()
 *     .service(
 *         web::scope("/api/v1/auth")
 *             .wrap(RateLimit::login())  // 5次/分钟
 *             .route("/login", web::post().to(login))
 *     )
 * ```
 *
 * ## 限制规则
 *
 * - 已认证请求以用户 ID 作为限制键，否则使用客户端 IP
 * - 不同端点通过前缀区分计数
 * - 超过限制返回 429 Too Many Requests
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 全局速率限制计数
/// 键: 前缀:标识，值: (窗口内计数, 窗口起始秒)
static RATE_LIMIT_CACHE: Lazy<Cache<String, (u32, i64)>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(MAX_WINDOW_SECS))
        .max_capacity(100_000)
        .build()
});

/// 计数条目的最长存活时间，窗口不应超过此值
const MAX_WINDOW_SECS: u64 = 3600;

/// 固定窗口计数：返回 (新计数, 窗口起始, 是否超限)
fn next_window_count(
    entry: Option<(u32, i64)>,
    now: i64,
    max_requests: u32,
    window_secs: u64,
) -> (u32, i64, bool) {
    match entry {
        Some((count, start)) if now - start < window_secs as i64 => {
            if count >= max_requests {
                (count, start, true)
            } else {
                (count + 1, start, false)
            }
        }
        // 无记录或窗口已过期，开启新窗口
        _ => (1, now, max_requests == 0),
    }
}

/// 速率限制配置
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（秒）
    window_secs: u64,
    /// 限制键前缀（用于区分不同端点）
    key_prefix: String,
}

impl RateLimit {
    /// 创建新的速率限制器
    ///
    /// # 参数
    /// - `max_requests`: 时间窗口内允许的最大请求数
    /// - `window_secs`: 时间窗口（秒）
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs: window_secs.min(MAX_WINDOW_SECS),
            key_prefix: String::new(),
        }
    }

    /// 设置限制键前缀
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 登录端点限制：5次/分钟/IP
    pub fn login() -> Self {
        Self::new(5, 60).with_prefix("login")
    }

    /// 注册端点限制：3次/分钟/IP
    pub fn register() -> Self {
        Self::new(3, 60).with_prefix("register")
    }

    /// 刷新令牌限制：10次/分钟/IP（防止暴力攻击）
    pub fn refresh_token() -> Self {
        Self::new(10, 60).with_prefix("refresh")
    }

    /// 批量写入限制：20次/分钟/用户（批量考勤、批量成绩）
    pub fn bulk_write() -> Self {
        Self::new(20, 60).with_prefix("bulk")
    }
}

/// 客户端 IP：优先连接信息，其次 X-Forwarded-For 首项，最后 X-Real-IP
///
/// 转发头可被伪造，直接暴露在不可信网络时应在反向代理处覆盖它们。
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req.connection_info().realip_remote_addr().map(str::to_owned);

    let header = |name: &str| -> Option<String> {
        let value = req.headers().get(name)?.to_str().ok()?;
        Some(value.split(',').next()?.trim().to_owned())
    };

    [
        connection_ip.clone(),
        header("X-Forwarded-For"),
        header("X-Real-IP"),
    ]
    .into_iter()
    .flatten()
    .find(|ip| ip.parse::<IpAddr>().is_ok())
    .or(connection_ip)
    .unwrap_or_else(|| "unknown".to_string())
}

/// 从请求中提取用户 ID（如果已认证）
fn extract_user_id(req: &ServiceRequest) -> Option<i64> {
    req.extensions().get::<User>().map(|user| user.id)
}

/// 创建速率限制错误响应
fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "请求过于频繁，请稍后再试",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            max_requests: self.max_requests,
            window_secs: self.window_secs,
            key_prefix: self.key_prefix.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let max_requests = self.max_requests;
        let window_secs = self.window_secs;
        let key_prefix = self.key_prefix.clone();

        Box::pin(async move {
            // 构建限制键
            let identifier = extract_user_id(&req)
                .map(|id| format!("user:{}", id))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));

            let cache_key = if key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", key_prefix, identifier)
            };

            let now = chrono::Utc::now().timestamp();
            let entry = RATE_LIMIT_CACHE.get(&cache_key).await;
            let (count, window_start, exceeded) =
                next_window_count(entry, now, max_requests, window_secs);

            if exceeded {
                let retry_after = (window_start + window_secs as i64 - now).max(1) as u64;
                warn!(
                    "Rate limit exceeded for key: {} (count: {}/{})",
                    cache_key, count, max_requests
                );
                return Ok(req
                    .into_response(create_rate_limit_response(retry_after).map_into_right_body()));
            }

            RATE_LIMIT_CACHE
                .insert(cache_key, (count, window_start))
                .await;

            // 继续处理请求
            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_window_counting() {
        // 新窗口
        assert_eq!(next_window_count(None, 100, 3, 60), (1, 100, false));
        // 窗口内递增直至上限
        assert_eq!(next_window_count(Some((2, 100)), 130, 3, 60), (3, 100, false));
        assert_eq!(next_window_count(Some((3, 100)), 159, 3, 60), (3, 100, true));
        // 窗口过期后重置
        assert_eq!(next_window_count(Some((3, 100)), 160, 3, 60), (1, 160, false));
    }

    #[test]
    fn test_client_ip_skips_malformed_headers() {
        let req = actix_web::test::TestRequest::default()
            .insert_header(("X-Forwarded-For", "not-an-ip"))
            .insert_header(("X-Real-IP", "10.1.1.1"))
            .to_srv_request();
        assert_eq!(extract_client_ip(&req), "10.1.1.1");

        let req = actix_web::test::TestRequest::default()
            .insert_header(("X-Forwarded-For", "192.168.0.7, 10.0.0.1"))
            .to_srv_request();
        assert_eq!(extract_client_ip(&req), "192.168.0.7");
    }

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_secs, 60);
        assert_eq!(login.key_prefix, "login");

        let register = RateLimit::register();
        assert_eq!(register.max_requests, 3);
        assert_eq!(register.window_secs, 60);

        let refresh = RateLimit::refresh_token();
        assert_eq!(refresh.max_requests, 10);
        assert_eq!(refresh.key_prefix, "refresh");

        let bulk = RateLimit::bulk_write();
        assert_eq!(bulk.max_requests, 20);
        assert_eq!(bulk.key_prefix, "bulk");
    }
}
