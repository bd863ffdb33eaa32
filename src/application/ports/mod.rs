//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod chapter_storage;
mod identity;
mod repositories;

pub use chapter_storage::{new_storage_key, ChapterStorageError, ChapterStoragePort};
pub use identity::{
    AuthClaims, AuthTokenPort, IdentityError, IdentityVerifierPort, VerifiedTelegramUser,
};
pub use repositories::{
    ChapterRecord, ChapterRepositoryPort, ListRecord, ListRepositoryPort, NovelFilter,
    NovelRecord, NovelRepositoryPort, RepositoryError, UserRecord, UserRepositoryPort,
};
