//! Chapter Storage Port - 章节正文对象存储
//!
//! 章节正文不落关系库，以不透明 key 存入对象存储。
//! 本端口只透传 key 与文本，不关心内容。

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// 对象存储错误
#[derive(Debug, Error)]
pub enum ChapterStorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Storage gateway error: {0}")]
    GatewayError(String),
}

/// 为新章节生成存储 key
pub fn new_storage_key(chapter_id: Uuid) -> String {
    format!("chapters/{}.txt", chapter_id)
}

/// Chapter Storage Port
#[async_trait]
pub trait ChapterStoragePort: Send + Sync {
    /// 写入正文（已存在则覆盖）
    async fn put_text(&self, key: &str, content: &str) -> Result<(), ChapterStorageError>;

    /// 读取正文
    async fn get_text(&self, key: &str) -> Result<String, ChapterStorageError>;

    /// 删除正文（不存在视为成功）
    async fn delete(&self, key: &str) -> Result<(), ChapterStorageError>;
}
