//! SQLite 持久化实现

mod chapter_repo;
mod database;
mod list_repo;
mod novel_repo;
mod user_repo;

pub use chapter_repo::SqliteChapterRepository;
pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use list_repo::SqliteListRepository;
pub use novel_repo::SqliteNovelRepository;
pub use user_repo::SqliteUserRepository;
