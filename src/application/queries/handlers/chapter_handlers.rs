//! Chapter Query Handlers

use std::sync::Arc;

use crate::application::authorization::authorize_novel;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, ChapterStorageError, ChapterStoragePort,
    NovelRepositoryPort,
};
use crate::application::queries::{GetChapter, ListChapters};
use crate::domain::access::NovelAction;

/// 章节及正文响应
#[derive(Debug, Clone)]
pub struct ChapterContentResponse {
    pub chapter: ChapterRecord,
    pub content: String,
}

/// GetChapter Handler - 经父小说解析读取权限后取回正文
pub struct GetChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    chapter_storage: Arc<dyn ChapterStoragePort>,
}

impl GetChapterHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        chapter_storage: Arc<dyn ChapterStoragePort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
            chapter_storage,
        }
    }

    pub async fn handle(
        &self,
        query: GetChapter,
    ) -> Result<ChapterContentResponse, ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(query.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", query.chapter_id))?;

        authorize_novel(
            self.novel_repo.as_ref(),
            query.principal,
            NovelAction::Read,
            chapter.novel_id,
        )
        .await?;

        let content = match self.chapter_storage.get_text(&chapter.storage_key).await {
            Ok(content) => content,
            // 行存在但正文缺失：存储不一致，记录后按内部错误上报
            Err(ChapterStorageError::NotFound(key)) => {
                tracing::error!(
                    chapter_id = %chapter.id,
                    storage_key = %key,
                    "Chapter body missing from storage"
                );
                return Err(ApplicationError::StorageError(format!(
                    "chapter body missing: {}",
                    key
                )));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ChapterContentResponse { chapter, content })
    }
}

/// ListChapters Handler - 元数据列表，不取正文
pub struct ListChaptersHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListChaptersHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(
        &self,
        query: ListChapters,
    ) -> Result<Vec<ChapterRecord>, ApplicationError> {
        authorize_novel(
            self.novel_repo.as_ref(),
            query.principal,
            NovelAction::Read,
            query.novel_id,
        )
        .await?;

        self.chapter_repo
            .find_by_novel(query.novel_id)
            .await
            .map_err(Into::into)
    }
}
