//! Saltfish - 翻译连载小说发布与追踪系统
//!
//! - Domain: access/, novel/, ordering/, list/
//! - Application: commands, queries, ports
//! - Infrastructure: http, persistence, adapters

use std::sync::Arc;

use saltfish::config::{load_config, print_config, StorageMode};
use saltfish::infrastructure::adapters::{
    FileChapterStorage, HttpChapterStorage, HttpChapterStorageConfig, JwtTokenService,
    TelegramInitDataVerifier,
};
use saltfish::infrastructure::http::{AppState, HttpServer, ServerConfig};
use saltfish::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository, SqliteListRepository,
    SqliteNovelRepository, SqliteUserRepository,
};

use saltfish::application::ports::ChapterStoragePort;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},saltfish={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Saltfish - 翻译连载小说发布系统");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let novel_repo = Arc::new(SqliteNovelRepository::new(pool.clone()));
    let chapter_repo = Arc::new(SqliteChapterRepository::new(pool.clone()));
    let list_repo = Arc::new(SqliteListRepository::new(pool.clone()));

    // 创建章节正文存储适配器
    let chapter_storage: Arc<dyn ChapterStoragePort> = match config.storage.mode {
        StorageMode::Local => {
            Arc::new(FileChapterStorage::new(&config.storage.chapters_dir).await?)
        }
        StorageMode::Remote => {
            let mut storage_config = HttpChapterStorageConfig::new(
                config
                    .storage
                    .remote_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("storage.remote_url is required"))?,
            );
            storage_config.timeout_secs = config.storage.remote_timeout_secs;
            storage_config.secret = config.storage.remote_secret.clone();
            Arc::new(HttpChapterStorage::new(storage_config)?)
        }
    };

    // 创建认证适配器
    let identity_verifier = Arc::new(TelegramInitDataVerifier::new(&config.auth.bot_token));
    let auth_tokens = Arc::new(
        JwtTokenService::new(&config.auth.jwt_secret)?
            .with_ttl_hours(config.auth.token_ttl_hours),
    );

    // 创建 HTTP 服务器
    let mut server_config = ServerConfig::new(&config.server.host, config.server.port);
    if config.server.static_files.enabled {
        server_config = server_config
            .with_static_dir(config.server.static_files.dir.display().to_string());
    }

    let state = AppState::new(
        user_repo,
        novel_repo,
        chapter_repo,
        list_repo,
        chapter_storage,
        identity_verifier,
        auth_tokens,
    );

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
