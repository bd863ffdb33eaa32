//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, StorageMode};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SALTFISH_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SALTFISH_SERVER__PORT=8080`
/// - `SALTFISH_DATABASE__PATH=/data/saltfish.db`
/// - `SALTFISH_AUTH__BOT_TOKEN=123456:ABC`
/// - `SALTFISH_STORAGE__MODE=remote`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("server.static_files.enabled", false)?
        .set_default("server.static_files.dir", "web")?
        .set_default("database.path", "data/saltfish.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.mode", "local")?
        .set_default("storage.chapters_dir", "data/chapters")?
        .set_default("storage.remote_timeout_secs", 30)?
        .set_default("auth.token_ttl_hours", 24 * 7)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: SALTFISH_，层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("SALTFISH")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.storage.mode == StorageMode::Remote && config.storage.remote_url.is_none() {
        return Err(ConfigError::ValidationError(
            "storage.remote_url is required when storage.mode is remote".to_string(),
        ));
    }

    if config.auth.token_ttl_hours <= 0 {
        return Err(ConfigError::ValidationError(
            "Token TTL must be positive".to_string(),
        ));
    }

    // bot_token 允许为空（登录端点在运行期返回 NotConfigured），
    // jwt_secret 由 JwtTokenService::new 在启动时检查
    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    if config.server.static_files.enabled {
        tracing::info!("Static Files: {:?}", config.server.static_files.dir);
    }
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    match config.storage.mode {
        StorageMode::Local => {
            tracing::info!("Chapter Storage: local ({:?})", config.storage.chapters_dir);
        }
        StorageMode::Remote => {
            tracing::info!(
                "Chapter Storage: remote ({})",
                config.storage.remote_url.as_deref().unwrap_or("-")
            );
        }
    }
    tracing::info!(
        "Telegram Auth: {}",
        if config.auth.bot_token.is_empty() {
            "not configured"
        } else {
            "configured"
        }
    );
    tracing::info!("Token TTL: {}h", config.auth.token_ttl_hours);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5070);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_remote_mode_requires_url() {
        let mut config = AppConfig::default();
        config.storage.mode = StorageMode::Remote;
        assert!(validate_config(&config).is_err());

        config.storage.remote_url = Some("http://storage.local:9000".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_database_url_format() {
        let config = AppConfig::default();
        assert_eq!(
            config.database.database_url(),
            "sqlite:data/saltfish.db?mode=rwc"
        );
    }
}
