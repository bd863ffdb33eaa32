//! File Chapter Storage - 文件系统章节正文存储实现
//!
//! 实现 ChapterStoragePort trait，把存储 key 映射为 base_dir 下的相对路径

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ChapterStorageError, ChapterStoragePort};

/// 文件系统章节存储
pub struct FileChapterStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileChapterStorage {
    /// 创建新的文件存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, ChapterStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| ChapterStorageError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// key 形如 "chapters/<uuid>.txt"，只接受纯相对路径
    fn resolve(&self, key: &str) -> Result<PathBuf, ChapterStorageError> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
            return Err(ChapterStorageError::IoError(format!(
                "invalid storage key: {}",
                key
            )));
        }
        Ok(self.base_dir.join(key))
    }
}

#[async_trait]
impl ChapterStoragePort for FileChapterStorage {
    async fn put_text(&self, key: &str, content: &str) -> Result<(), ChapterStorageError> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ChapterStorageError::IoError(e.to_string()))?;
        }

        fs::write(&path, content)
            .await
            .map_err(|e| ChapterStorageError::IoError(e.to_string()))?;

        tracing::debug!("Saved chapter body: key={}, size={} bytes", key, content.len());

        Ok(())
    }

    async fn get_text(&self, key: &str) -> Result<String, ChapterStorageError> {
        let path = self.resolve(key)?;

        if !path.exists() {
            return Err(ChapterStorageError::NotFound(key.to_string()));
        }

        fs::read_to_string(&path)
            .await
            .map_err(|e| ChapterStorageError::IoError(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), ChapterStorageError> {
        let path = self.resolve(key)?;

        if path.exists() {
            fs::remove_file(&path)
                .await
                .map_err(|e| ChapterStorageError::IoError(e.to_string()))?;

            tracing::debug!("Deleted chapter body: key={}", key);
        }

        Ok(())
    }
}
