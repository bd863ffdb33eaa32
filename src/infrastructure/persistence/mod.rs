//! 持久化层

pub mod sqlite;

pub use sqlite::{
    create_pool, run_migrations, DatabaseConfig, DbPool, SqliteChapterRepository,
    SqliteListRepository, SqliteNovelRepository, SqliteUserRepository,
};
