use config::{Config, ConfigError, Environment, File, FileFormat};
use std::sync::OnceLock;
use tracing::warn;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 示例配置中的占位密钥，生产环境必须替换
const PLACEHOLDER_JWT_SECRET: &str = "change-me-in-production";

/// 兼容常见部署习惯的独立环境变量：(配置键, 变量名)
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("app.environment", "APP_ENV"),
    ("app.log_level", "RUST_LOG"),
    ("server.host", "SERVER_HOST"),
    ("server.port", "SERVER_PORT"),
    ("server.unix_socket_path", "UNIX_SOCKET"),
    ("server.workers", "CPU_COUNT"),
    ("jwt.secret", "JWT_SECRET"),
    ("database.url", "DATABASE_URL"),
    ("school.default_academic_year", "DEFAULT_ACADEMIC_YEAR"),
];

impl AppConfig {
    /// 按 config.toml -> config.{APP_ENV}.toml -> EDUPORTAL_* -> 独立变量 的顺序叠加
    pub fn load() -> Result<Self, ConfigError> {
        let env_name = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{env_name}")).required(false))
            .add_source(
                Environment::with_prefix("EDUPORTAL")
                    .separator("_")
                    .try_parsing(true),
            );

        for (key, var) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        Self::finish(builder.build()?)
    }

    /// 从 TOML 文本构建配置，不读取文件和环境变量
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::finish(
            Config::builder()
                .add_source(File::from_str(source, FileFormat::Toml))
                .build()?,
        )
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let mut app_config: AppConfig = config.try_deserialize()?;
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }
        app_config.validate()?;
        Ok(app_config)
    }

    /// 拒绝无法运行的配置；占位密钥在生产环境仅告警
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }
        if self.jwt.access_token_expiry <= 0
            || self.jwt.refresh_token_expiry <= 0
            || self.jwt.refresh_token_remember_me_expiry <= 0
        {
            return Err(ConfigError::Message(
                "jwt token expiries must be positive".into(),
            ));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Message("database.url must not be empty".into()));
        }
        if self.is_production() && self.jwt.secret == PLACEHOLDER_JWT_SECRET {
            warn!("jwt.secret is still the placeholder value, set JWT_SECRET before going live");
        }
        Ok(())
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        APP_CONFIG
            .set(Self::load()?)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        Some(self.server.unix_socket_path.as_str()).filter(|path| !path.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../config.toml");

    #[test]
    fn test_sample_config_loads() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert!(config.is_development());
        assert!(config.server.workers >= 1);
        assert_eq!(config.server_bind_address(), "127.0.0.1:8080");
        assert_eq!(config.school.default_academic_year, "2024-2025");
        #[cfg(unix)]
        assert_eq!(config.unix_socket_path(), None);
    }

    #[test]
    fn test_rejects_unusable_jwt_settings() {
        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        config.jwt.secret = "  ".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        config.jwt.access_token_expiry = 0;
        assert!(config.validate().is_err());
    }
}
