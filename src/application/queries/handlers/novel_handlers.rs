//! Novel Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::authorization::authorize_novel;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, NovelRecord, NovelRepositoryPort,
};
use crate::application::queries::{GetNovel, GetSharedNovel, ListNovels};
use crate::domain::access::{NovelAction, Principal};

// ============================================================================
// Response DTOs
// ============================================================================

/// 小说详情响应
#[derive(Debug, Clone)]
pub struct NovelDetailResponse {
    pub novel: NovelRecord,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
    pub coauthor_ids: Vec<Uuid>,
    /// 章节元数据（不含正文），按 order 升序
    pub chapters: Vec<ChapterRecord>,
}

/// 小说列表条目
#[derive(Debug, Clone)]
pub struct NovelSummaryResponse {
    pub novel: NovelRecord,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
    pub chapter_count: u32,
    /// 当前用户是否以合著者身份参与
    pub coauthored: bool,
}

// ============================================================================
// GetNovel
// ============================================================================

/// GetNovel Handler
///
/// 读取解析失败时与不存在同样报告 NotFound。
/// 分享令牌只回给所有者。
pub struct GetNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl GetNovelHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, query: GetNovel) -> Result<NovelDetailResponse, ApplicationError> {
        let novel = authorize_novel(
            self.novel_repo.as_ref(),
            query.principal,
            NovelAction::Read,
            query.novel_id,
        )
        .await?;

        assemble_detail(
            self.novel_repo.as_ref(),
            self.chapter_repo.as_ref(),
            novel,
            query.principal,
        )
        .await
    }
}

/// 组装小说详情，按主体身份决定是否暴露分享令牌
async fn assemble_detail(
    novel_repo: &dyn NovelRepositoryPort,
    chapter_repo: &dyn ChapterRepositoryPort,
    mut novel: NovelRecord,
    principal: Principal,
) -> Result<NovelDetailResponse, ApplicationError> {
    let is_owner = principal.id == Some(novel.owner_id);
    if !is_owner {
        novel.share_token = None;
    }

    let tags = novel_repo.find_tags(novel.id).await?;
    let authors = novel_repo.find_authors(novel.id).await?;
    let coauthor_ids = novel_repo.find_coauthors(novel.id).await?;
    let chapters = chapter_repo.find_by_novel(novel.id).await?;

    Ok(NovelDetailResponse {
        novel,
        tags,
        authors,
        coauthor_ids,
        chapters,
    })
}

// ============================================================================
// ListNovels
// ============================================================================

/// ListNovels Handler - 拥有的在前，合著的在后
pub struct ListNovelsHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListNovelsHandler {
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
        query: ListNovels,
    ) -> Result<Vec<NovelSummaryResponse>, ApplicationError> {
        let user_id = query
            .principal
            .id
            .ok_or_else(|| ApplicationError::unauthorized("login required"))?;

        let owned = self.novel_repo.find_by_owner(user_id, &query.filter).await?;
        let coauthored = self.novel_repo.find_coauthored(user_id).await?;

        let mut summaries = Vec::with_capacity(owned.len() + coauthored.len());
        for (novel, is_coauthored) in owned
            .into_iter()
            .map(|n| (n, false))
            .chain(coauthored.into_iter().map(|n| (n, true)))
        {
            summaries.push(self.summarize(novel, is_coauthored, user_id).await?);
        }

        Ok(summaries)
    }

    async fn summarize(
        &self,
        mut novel: NovelRecord,
        coauthored: bool,
        user_id: Uuid,
    ) -> Result<NovelSummaryResponse, ApplicationError> {
        if novel.owner_id != user_id {
            novel.share_token = None;
        }

        let tags = self.novel_repo.find_tags(novel.id).await?;
        let authors = self.novel_repo.find_authors(novel.id).await?;
        // 稠密不变量成立时，章节数恰等于最大序号
        let chapter_count = self.chapter_repo.max_order(novel.id).await?.unwrap_or(0);

        Ok(NovelSummaryResponse {
            novel,
            tags,
            authors,
            chapter_count,
            coauthored,
        })
    }
}

// ============================================================================
// GetSharedNovel
// ============================================================================

/// GetSharedNovel Handler - 分享链接的匿名入口
///
/// 令牌即能力：按精确令牌查到的行必然 is_public，
/// 详情按匿名主体组装（不暴露令牌本身之外的管理信息）。
pub struct GetSharedNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl GetSharedNovelHandler {
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
        query: GetSharedNovel,
    ) -> Result<NovelDetailResponse, ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_share_token(&query.token)
            .await?
            .ok_or_else(|| {
                ApplicationError::validation("share link is invalid or has been revoked")
            })?;

        assemble_detail(
            self.novel_repo.as_ref(),
            self.chapter_repo.as_ref(),
            novel,
            Principal::anonymous(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::application::ports::{UserRecord, UserRepositoryPort};
    use crate::domain::access::Role;
    use crate::domain::novel::NovelStatus;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository,
        SqliteNovelRepository, SqliteUserRepository,
    };

    struct Harness {
        user_repo: Arc<dyn UserRepositoryPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    }

    impl Harness {
        fn get_novel(&self) -> GetNovelHandler {
            GetNovelHandler::new(self.novel_repo.clone(), self.chapter_repo.clone())
        }

        fn get_shared(&self) -> GetSharedNovelHandler {
            GetSharedNovelHandler::new(self.novel_repo.clone(), self.chapter_repo.clone())
        }
    }

    async fn harness() -> Harness {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Harness {
            user_repo: Arc::new(SqliteUserRepository::new(pool.clone())),
            novel_repo: Arc::new(SqliteNovelRepository::new(pool.clone())),
            chapter_repo: Arc::new(SqliteChapterRepository::new(pool)),
        }
    }

    async fn seed_novel(h: &Harness, owner_id: Uuid) -> NovelRecord {
        let now = Utc::now();
        let owner = UserRecord {
            id: owner_id,
            telegram_id: owner_id.to_string(),
            username: None,
            first_name: None,
            last_name: None,
            avatar_url: None,
            bio: None,
            role: Role::Author,
            created_at: now,
            updated_at: now,
        };
        h.user_repo.save(&owner).await.unwrap();
        let novel = NovelRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: "Шторм".to_string(),
            original_title: "Storm".to_string(),
            description: None,
            cover_url: None,
            year: None,
            original_status: NovelStatus::Ongoing,
            translation_status: NovelStatus::Ongoing,
            is_public: false,
            share_token: None,
            created_at: now,
            updated_at: now,
        };
        h.novel_repo.save(&novel).await.unwrap();
        novel
    }

    /// 私有小说对外读取与不存在不可区分
    #[tokio::test]
    async fn test_private_novel_read_reported_as_not_found() {
        let h = harness().await;
        let novel = seed_novel(&h, Uuid::new_v4()).await;
        let stranger = Principal::authenticated(Uuid::new_v4(), Role::Author);

        let existing = h
            .get_novel()
            .handle(GetNovel {
                principal: stranger,
                novel_id: novel.id,
            })
            .await;
        let missing = h
            .get_novel()
            .handle(GetNovel {
                principal: stranger,
                novel_id: Uuid::new_v4(),
            })
            .await;

        assert!(matches!(existing, Err(ApplicationError::NotFound { .. })));
        assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));
    }

    /// 分享令牌只回给所有者
    #[tokio::test]
    async fn test_share_token_hidden_from_non_owners() {
        let h = harness().await;
        let owner_id = Uuid::new_v4();
        let novel = seed_novel(&h, owner_id).await;
        h.novel_repo
            .set_share(novel.id, true, Some("tok-abc123"))
            .await
            .unwrap();

        let owner_view = h
            .get_novel()
            .handle(GetNovel {
                principal: Principal::authenticated(owner_id, Role::Author),
                novel_id: novel.id,
            })
            .await
            .unwrap();
        assert_eq!(owner_view.novel.share_token.as_deref(), Some("tok-abc123"));

        let anonymous_view = h
            .get_shared()
            .handle(GetSharedNovel {
                token: "tok-abc123".to_string(),
            })
            .await
            .unwrap();
        assert!(anonymous_view.novel.share_token.is_none());
    }

    /// 撤销后的令牌立即失效
    #[tokio::test]
    async fn test_revoked_token_rejected() {
        let h = harness().await;
        let novel = seed_novel(&h, Uuid::new_v4()).await;
        h.novel_repo
            .set_share(novel.id, true, Some("tok-old"))
            .await
            .unwrap();
        h.novel_repo.set_share(novel.id, false, None).await.unwrap();

        let result = h
            .get_shared()
            .handle(GetSharedNovel {
                token: "tok-old".to_string(),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }
}
