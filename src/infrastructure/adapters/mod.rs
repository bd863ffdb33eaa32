//! 基础设施适配器 - 出站端口的具体实现

pub mod auth;
pub mod storage;

pub use auth::{JwtTokenService, TelegramInitDataVerifier};
pub use storage::{FileChapterStorage, HttpChapterStorage, HttpChapterStorageConfig};
