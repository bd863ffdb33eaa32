//! Chapter Command Handlers
//!
//! 章节操作全部以父小说的 Write 权限解析；
//! 排序竞争（Conflict）在此做一次有界重试，重排集合错误绝不重试。

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::authorization::authorize_novel;
use crate::application::commands::{
    CreateChapter, DeleteChapter, ReorderChapters, UpdateChapter,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    new_storage_key, ChapterRecord, ChapterRepositoryPort, ChapterStoragePort,
    NovelRepositoryPort, RepositoryError,
};
use crate::domain::access::NovelAction;
use crate::domain::novel::Title;
use crate::domain::ordering::{next_order, plan_explicit_order, ReorderError};

/// 排序竞争的最大尝试次数（首次 + 一次重试）
const ORDER_ATTEMPTS: usize = 2;

// ============================================================================
// CreateChapter
// ============================================================================

/// CreateChapter Handler - 尾部插入
///
/// 正文先写入对象存储，再落章节行；
/// 序号必须基于插入时实时读取的最大值计算。
pub struct CreateChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    chapter_storage: Arc<dyn ChapterStoragePort>,
}

impl CreateChapterHandler {
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

    pub async fn handle(&self, command: CreateChapter) -> Result<ChapterRecord, ApplicationError> {
        let novel = authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::Write,
            command.novel_id,
        )
        .await?;

        let title = Title::new(command.title).map_err(ApplicationError::validation)?;

        let chapter_id = Uuid::new_v4();
        let storage_key = new_storage_key(chapter_id);
        self.chapter_storage
            .put_text(&storage_key, &command.content)
            .await?;

        let mut last_err = None;
        for attempt in 0..ORDER_ATTEMPTS {
            let max = self.chapter_repo.max_order(novel.id).await?;
            let now = Utc::now();
            let chapter = ChapterRecord {
                id: chapter_id,
                novel_id: novel.id,
                title: title.as_str().to_string(),
                order: next_order(max),
                storage_key: storage_key.clone(),
                created_at: now,
                updated_at: now,
            };

            match self.chapter_repo.insert(&chapter).await {
                Ok(()) => {
                    tracing::info!(
                        chapter_id = %chapter.id,
                        novel_id = %novel.id,
                        order = chapter.order,
                        "Chapter created"
                    );
                    return Ok(chapter);
                }
                Err(RepositoryError::Conflict(msg)) => {
                    tracing::warn!(
                        novel_id = %novel.id,
                        attempt = attempt + 1,
                        error = %msg,
                        "Chapter order conflict, retrying with fresh max"
                    );
                    last_err = Some(RepositoryError::Conflict(msg));
                }
                Err(e) => {
                    self.cleanup_body(&storage_key).await;
                    return Err(e.into());
                }
            }
        }

        self.cleanup_body(&storage_key).await;
        Err(last_err
            .map(ApplicationError::from)
            .unwrap_or_else(|| ApplicationError::internal("chapter insert failed")))
    }

    async fn cleanup_body(&self, storage_key: &str) {
        if let Err(e) = self.chapter_storage.delete(storage_key).await {
            tracing::warn!(storage_key = %storage_key, error = %e, "Failed to clean up chapter body");
        }
    }
}

// ============================================================================
// UpdateChapter
// ============================================================================

/// UpdateChapter Handler
///
/// 正文覆盖写到原有 key，标题走关系库。
pub struct UpdateChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    chapter_storage: Arc<dyn ChapterStoragePort>,
}

impl UpdateChapterHandler {
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

    pub async fn handle(&self, command: UpdateChapter) -> Result<ChapterRecord, ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(command.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.chapter_id))?;

        authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::Write,
            chapter.novel_id,
        )
        .await?;

        if let Some(content) = &command.content {
            self.chapter_storage
                .put_text(&chapter.storage_key, content)
                .await?;
        }

        if let Some(title) = command.title {
            let title = Title::new(title).map_err(ApplicationError::validation)?;
            self.chapter_repo
                .update_title(chapter.id, title.as_str())
                .await?;
        } else if command.content.is_some() {
            // 纯正文更新不经过关系库字段，时间戳单独跟进
            self.chapter_repo.touch(chapter.id).await?;
        }

        // 重读保证返回值与落库状态一致
        let chapter = self
            .chapter_repo
            .find_by_id(command.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.chapter_id))?;

        tracing::info!(chapter_id = %chapter.id, "Chapter updated");

        Ok(chapter)
    }
}

// ============================================================================
// DeleteChapter
// ============================================================================

/// DeleteChapter Handler - 删除并压缩序号
pub struct DeleteChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    chapter_storage: Arc<dyn ChapterStoragePort>,
}

impl DeleteChapterHandler {
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

    pub async fn handle(&self, command: DeleteChapter) -> Result<(), ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(command.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.chapter_id))?;

        authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::Write,
            chapter.novel_id,
        )
        .await?;

        let mut last_err = None;
        for attempt in 0..ORDER_ATTEMPTS {
            match self
                .chapter_repo
                .remove_and_compact(chapter.novel_id, chapter.id)
                .await
            {
                Ok(()) => {
                    last_err = None;
                    break;
                }
                Err(RepositoryError::Conflict(msg)) => {
                    tracing::warn!(
                        chapter_id = %chapter.id,
                        attempt = attempt + 1,
                        error = %msg,
                        "Compaction conflict, retrying"
                    );
                    last_err = Some(RepositoryError::Conflict(msg));
                }
                Err(e) => return Err(e.into()),
            }
        }
        if let Some(e) = last_err {
            return Err(e.into());
        }

        // 行已删除，正文清理失败只告警
        if let Err(e) = self.chapter_storage.delete(&chapter.storage_key).await {
            tracing::warn!(
                chapter_id = %chapter.id,
                storage_key = %chapter.storage_key,
                error = %e,
                "Failed to delete chapter body"
            );
        }

        tracing::info!(
            chapter_id = %chapter.id,
            novel_id = %chapter.novel_id,
            order = chapter.order,
            "Chapter deleted"
        );

        Ok(())
    }
}

// ============================================================================
// ReorderChapters
// ============================================================================

/// ReorderChapters Handler - 显式全量重排
///
/// 提交的 id 集合必须恰好是小说当前章节集合的排列，
/// 校验失败直接上抛（ValidationError），不做任何部分应用。
pub struct ReorderChaptersHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ReorderChaptersHandler {
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
        command: ReorderChapters,
    ) -> Result<Vec<ChapterRecord>, ApplicationError> {
        let novel = authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::Write,
            command.novel_id,
        )
        .await?;

        let mut last_err = None;
        for attempt in 0..ORDER_ATTEMPTS {
            let current = self.chapter_repo.find_by_novel(novel.id).await?;
            let current_ids: Vec<Uuid> = current.iter().map(|c| c.id).collect();

            let plan = plan_explicit_order(&current_ids, &command.chapter_ids).map_err(
                |ReorderError::InvalidReorderSet(msg)| ApplicationError::validation(msg),
            )?;

            match self.chapter_repo.apply_order(novel.id, &plan).await {
                Ok(()) => {
                    tracing::info!(
                        novel_id = %novel.id,
                        chapters = plan.len(),
                        "Chapters reordered"
                    );
                    return self
                        .chapter_repo
                        .find_by_novel(novel.id)
                        .await
                        .map_err(Into::into);
                }
                Err(RepositoryError::Conflict(msg)) => {
                    tracing::warn!(
                        novel_id = %novel.id,
                        attempt = attempt + 1,
                        error = %msg,
                        "Reorder conflict, re-reading chapter set"
                    );
                    last_err = Some(RepositoryError::Conflict(msg));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_err
            .map(ApplicationError::from)
            .unwrap_or_else(|| ApplicationError::internal("reorder failed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::{AddCoauthorHandler, CreateNovelHandler, DeleteNovelHandler};
    use crate::application::commands::{AddCoauthor, CreateNovel, DeleteNovel};
    use crate::application::ports::{UserRecord, UserRepositoryPort};
    use crate::domain::access::{Principal, Role};
    use crate::domain::novel::NovelStatus;
    use crate::infrastructure::adapters::FileChapterStorage;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository,
        SqliteNovelRepository, SqliteUserRepository,
    };
    use tempfile::tempdir;

    struct Harness {
        _tmp: tempfile::TempDir,
        user_repo: Arc<dyn UserRepositoryPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        storage: Arc<dyn ChapterStoragePort>,
    }

    async fn harness() -> Harness {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let tmp = tempdir().unwrap();
        let storage = Arc::new(FileChapterStorage::new(tmp.path()).await.unwrap());

        Harness {
            _tmp: tmp,
            user_repo: Arc::new(SqliteUserRepository::new(pool.clone())),
            novel_repo: Arc::new(SqliteNovelRepository::new(pool.clone())),
            chapter_repo: Arc::new(SqliteChapterRepository::new(pool.clone())),
            storage,
        }
    }

    async fn signup(h: &Harness, telegram_id: &str) -> Principal {
        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            telegram_id: telegram_id.to_string(),
            username: None,
            first_name: None,
            last_name: None,
            avatar_url: None,
            bio: None,
            role: Role::Author,
            created_at: now,
            updated_at: now,
        };
        h.user_repo.save(&user).await.unwrap();
        Principal::authenticated(user.id, Role::Author)
    }

    async fn create_novel(h: &Harness, owner: Principal, title: &str) -> Uuid {
        CreateNovelHandler::new(h.novel_repo.clone())
            .handle(CreateNovel {
                principal: owner,
                title: title.to_string(),
                original_title: title.to_string(),
                description: None,
                cover_url: None,
                year: None,
                original_status: NovelStatus::Ongoing,
                translation_status: NovelStatus::Ongoing,
                tags: Vec::new(),
                authors: Vec::new(),
            })
            .await
            .unwrap()
            .id
    }

    async fn create_chapter(h: &Harness, principal: Principal, novel_id: Uuid, title: &str) -> ChapterRecord {
        CreateChapterHandler::new(h.novel_repo.clone(), h.chapter_repo.clone(), h.storage.clone())
            .handle(CreateChapter {
                principal,
                novel_id,
                title: title.to_string(),
                content: format!("body of {}", title),
            })
            .await
            .unwrap()
    }

    fn titles_in_order(chapters: &[ChapterRecord]) -> Vec<(&str, u32)> {
        chapters.iter().map(|c| (c.title.as_str(), c.order)).collect()
    }

    /// 所有者建三章，合著者删第二章并倒序重排；
    /// 合著者始终不能删小说本身。
    #[tokio::test]
    async fn test_owner_and_coauthor_full_scenario() {
        let h = harness().await;
        let owner = signup(&h, "100").await;
        let coauthor = signup(&h, "200").await;

        let novel_id = create_novel(&h, owner, "Ночной паром").await;

        let c1 = create_chapter(&h, owner, novel_id, "One").await;
        let c2 = create_chapter(&h, owner, novel_id, "Two").await;
        let c3 = create_chapter(&h, owner, novel_id, "Three").await;
        assert_eq!((c1.order, c2.order, c3.order), (1, 2, 3));

        AddCoauthorHandler::new(h.novel_repo.clone(), h.user_repo.clone())
            .handle(AddCoauthor {
                principal: owner,
                novel_id,
                user_id: coauthor.id.unwrap(),
            })
            .await
            .unwrap();

        // 合著者可以写：删除第二章，序号压缩为 1..2
        DeleteChapterHandler::new(h.novel_repo.clone(), h.chapter_repo.clone(), h.storage.clone())
            .handle(DeleteChapter {
                principal: coauthor,
                chapter_id: c2.id,
            })
            .await
            .unwrap();

        let remaining = h.chapter_repo.find_by_novel(novel_id).await.unwrap();
        assert_eq!(titles_in_order(&remaining), vec![("One", 1), ("Three", 2)]);

        // 合著者倒序重排
        let reordered = ReorderChaptersHandler::new(h.novel_repo.clone(), h.chapter_repo.clone())
            .handle(ReorderChapters {
                principal: coauthor,
                novel_id,
                chapter_ids: vec![c3.id, c1.id],
            })
            .await
            .unwrap();
        assert_eq!(titles_in_order(&reordered), vec![("Three", 1), ("One", 2)]);

        // 合著者不能删小说
        let err = DeleteNovelHandler::new(
            h.novel_repo.clone(),
            h.chapter_repo.clone(),
            h.storage.clone(),
        )
        .handle(DeleteNovel {
            principal: coauthor,
            novel_id,
        })
        .await;
        assert!(matches!(err, Err(ApplicationError::Forbidden(_))));
    }

    /// 纯正文更新也要落库 updated_at
    #[tokio::test]
    async fn test_content_only_update_persists_timestamp() {
        let h = harness().await;
        let owner = signup(&h, "100").await;
        let novel_id = create_novel(&h, owner, "Причал").await;
        let chapter = create_chapter(&h, owner, novel_id, "One").await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = UpdateChapterHandler::new(
            h.novel_repo.clone(),
            h.chapter_repo.clone(),
            h.storage.clone(),
        )
        .handle(UpdateChapter {
            principal: owner,
            chapter_id: chapter.id,
            title: None,
            content: Some("переписанный текст".to_string()),
        })
        .await
        .unwrap();

        assert!(updated.updated_at > chapter.updated_at);

        let stored = h.chapter_repo.find_by_id(chapter.id).await.unwrap().unwrap();
        assert_eq!(stored.updated_at, updated.updated_at);
        assert_eq!(
            h.storage.get_text(&chapter.storage_key).await.unwrap(),
            "переписанный текст"
        );
    }

    /// 插入-删除往返恢复原序列
    #[tokio::test]
    async fn test_insert_then_remove_restores_sequence() {
        let h = harness().await;
        let owner = signup(&h, "100").await;
        let novel_id = create_novel(&h, owner, "Гавань").await;

        create_chapter(&h, owner, novel_id, "One").await;
        create_chapter(&h, owner, novel_id, "Two").await;
        let before = h.chapter_repo.find_by_novel(novel_id).await.unwrap();

        let extra = create_chapter(&h, owner, novel_id, "Extra").await;
        assert_eq!(extra.order, 3);

        DeleteChapterHandler::new(h.novel_repo.clone(), h.chapter_repo.clone(), h.storage.clone())
            .handle(DeleteChapter {
                principal: owner,
                chapter_id: extra.id,
            })
            .await
            .unwrap();

        let after = h.chapter_repo.find_by_novel(novel_id).await.unwrap();
        assert_eq!(titles_in_order(&before), titles_in_order(&after));
    }

    /// 重排集合不匹配 → ValidationError，章节不动
    #[tokio::test]
    async fn test_reorder_with_foreign_id_rejected_without_mutation() {
        let h = harness().await;
        let owner = signup(&h, "100").await;
        let novel_id = create_novel(&h, owner, "Мель").await;

        let c1 = create_chapter(&h, owner, novel_id, "One").await;
        create_chapter(&h, owner, novel_id, "Two").await;

        let err = ReorderChaptersHandler::new(h.novel_repo.clone(), h.chapter_repo.clone())
            .handle(ReorderChapters {
                principal: owner,
                novel_id,
                chapter_ids: vec![c1.id, Uuid::new_v4()],
            })
            .await;
        assert!(matches!(err, Err(ApplicationError::ValidationError(_))));

        let chapters = h.chapter_repo.find_by_novel(novel_id).await.unwrap();
        assert_eq!(titles_in_order(&chapters), vec![("One", 1), ("Two", 2)]);
    }

    /// 删除小说时章节正文一并清理
    #[tokio::test]
    async fn test_delete_novel_removes_chapter_bodies() {
        let h = harness().await;
        let owner = signup(&h, "100").await;
        let novel_id = create_novel(&h, owner, "Прилив").await;
        let chapter = create_chapter(&h, owner, novel_id, "One").await;

        DeleteNovelHandler::new(h.novel_repo.clone(), h.chapter_repo.clone(), h.storage.clone())
            .handle(DeleteNovel {
                principal: owner,
                novel_id,
            })
            .await
            .unwrap();

        assert!(h.novel_repo.find_by_id(novel_id).await.unwrap().is_none());
        assert!(h.storage.get_text(&chapter.storage_key).await.is_err());
    }
}
