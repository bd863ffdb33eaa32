//! 章节正文存储适配器

mod file_storage;
mod http_storage;

pub use file_storage::FileChapterStorage;
pub use http_storage::{HttpChapterStorage, HttpChapterStorageConfig};
