use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveTime;
use chrono_tz::Tz;
use shared::error::ErrorCode;

use crate::auth::JwtConfig;
use crate::utils::{AppError, time};

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | Europe/Madrid | 业务时区 (IANA) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志输出 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | DAY_CLOSE_RETRY_ATTEMPTS | 3 | 日结归档重试次数 |
/// | DAY_CLOSE_RETRY_BASE_DELAY_MS | 500 | 日结归档重试基础延迟 |
/// | SHIFT_AUTO_CLOSE_AT | (未设置) | 自动关闭班次的本地时刻 HH:MM |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/pos HTTP_PORT=8080 SHIFT_AUTO_CLOSE_AT=04:00 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 业务时区 (日期边界、月份归属)
    pub timezone: Tz,
    /// 日志级别 (被 RUST_LOG 覆盖)
    pub log_level: String,
    /// 是否输出 JSON 日志
    pub log_json: bool,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 日结归档事务的最大尝试次数
    pub day_close_retry_attempts: u32,
    /// 日结归档重试的基础延迟 (毫秒)，按指数退避
    pub day_close_retry_base_delay_ms: u64,
    /// 每日强制关闭班次的本地时刻，未设置则不启动调度器
    pub shift_auto_close_at: Option<NaiveTime>,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn config_error(message: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::ConfigError, message)
}

impl Config {
    /// 默认配置 (不读取环境变量)
    pub fn new(work_dir: impl Into<String>, jwt: JwtConfig) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 3000,
            jwt,
            environment: "development".into(),
            timezone: chrono_tz::Europe::Madrid,
            log_level: "info".into(),
            log_json: false,
            request_timeout_ms: 30_000,
            day_close_retry_attempts: 3,
            day_close_retry_base_delay_ms: 500,
            shift_auto_close_at: None,
        }
    }

    /// 从环境变量加载配置
    ///
    /// 未设置的项使用默认值；时区或时刻无法解析时返回 `ConfigError`
    pub fn from_env() -> Result<Self, AppError> {
        let jwt = JwtConfig::from_env().map_err(|e| config_error(e.to_string()))?;
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into());
        let mut config = Self::new(work_dir, jwt);

        config.http_port = env_or("HTTP_PORT", config.http_port);
        config.environment = std::env::var("ENVIRONMENT").unwrap_or(config.environment);
        config.log_level = std::env::var("LOG_LEVEL").unwrap_or(config.log_level);
        config.log_json = env_or("LOG_JSON", config.log_json);
        config.request_timeout_ms = env_or("REQUEST_TIMEOUT_MS", config.request_timeout_ms);
        config.day_close_retry_attempts =
            env_or("DAY_CLOSE_RETRY_ATTEMPTS", config.day_close_retry_attempts).max(1);
        config.day_close_retry_base_delay_ms = env_or(
            "DAY_CLOSE_RETRY_BASE_DELAY_MS",
            config.day_close_retry_base_delay_ms,
        );

        if let Ok(tz) = std::env::var("TIMEZONE") {
            config.timezone = tz
                .parse()
                .map_err(|_| config_error(format!("Unknown TIMEZONE '{tz}'")))?;
        }

        let auto_close = std::env::var("SHIFT_AUTO_CLOSE_AT")
            .ok()
            .filter(|v| !v.trim().is_empty());
        if let Some(at) = auto_close {
            let time = time::parse_hh_mm(&at).map_err(|_| {
                config_error(format!("SHIFT_AUTO_CLOSE_AT must be HH:MM, got '{at}'"))
            })?;
            config.shift_auto_close_at = Some(time);
        }

        Ok(config)
    }

    /// 数据库目录 (work_dir/database)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录 (work_dir/logs)
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".into(),
            expiration_minutes: 60,
            issuer: "pos-auth".into(),
            audience: "pos-server".into(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::new("/tmp/pos", jwt());
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.timezone, chrono_tz::Europe::Madrid);
        assert_eq!(config.day_close_retry_attempts, 3);
        assert_eq!(config.day_close_retry_base_delay_ms, 500);
        assert!(config.shift_auto_close_at.is_none());
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_work_dir_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::new(tmp.path().to_string_lossy(), jwt());
        config.ensure_work_dir_structure().unwrap();
        assert!(config.database_dir().is_dir());
        assert!(config.log_dir().is_dir());
        assert!(config.log_dir().ends_with("logs"));
    }
}
