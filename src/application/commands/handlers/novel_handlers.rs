//! Novel Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::authorization::authorize_novel;
use crate::application::commands::{
    AddCoauthor, CreateNovel, DeleteNovel, GenerateShareLink, RemoveCoauthor, RevokeShareLink,
    UpdateNovel,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRepositoryPort, ChapterStoragePort, NovelRecord, NovelRepositoryPort,
    UserRepositoryPort,
};
use crate::domain::access::NovelAction;
use crate::domain::novel::{ShareState, ShareToken, Title};

// ============================================================================
// CreateNovel
// ============================================================================

/// CreateNovel Handler
pub struct CreateNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl CreateNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: CreateNovel) -> Result<NovelRecord, ApplicationError> {
        let owner_id = command
            .principal
            .id
            .ok_or_else(|| ApplicationError::unauthorized("login required"))?;

        if !command.principal.role.can_create_novels() {
            return Err(ApplicationError::forbidden(
                "only authors may create novels",
            ));
        }

        let title = Title::new(command.title).map_err(ApplicationError::validation)?;
        let original_title =
            Title::new(command.original_title).map_err(ApplicationError::validation)?;

        let now = Utc::now();
        let novel = NovelRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into_string(),
            original_title: original_title.into_string(),
            description: command.description,
            cover_url: command.cover_url,
            year: command.year,
            original_status: command.original_status,
            translation_status: command.translation_status,
            is_public: false,
            share_token: None,
            created_at: now,
            updated_at: now,
        };

        self.novel_repo.save(&novel).await?;
        self.novel_repo.set_tags(novel.id, &command.tags).await?;
        self.novel_repo
            .set_authors(novel.id, &command.authors)
            .await?;

        tracing::info!(
            novel_id = %novel.id,
            owner_id = %owner_id,
            title = %novel.title,
            "Novel created"
        );

        Ok(novel)
    }
}

// ============================================================================
// UpdateNovel
// ============================================================================

/// UpdateNovel Handler - 所有者或合著者可编辑元数据
pub struct UpdateNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl UpdateNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: UpdateNovel) -> Result<NovelRecord, ApplicationError> {
        let mut novel = authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::Write,
            command.novel_id,
        )
        .await?;

        let patch = command.patch;

        if let Some(title) = patch.title {
            novel.title = Title::new(title)
                .map_err(ApplicationError::validation)?
                .into_string();
        }
        if let Some(original_title) = patch.original_title {
            novel.original_title = Title::new(original_title)
                .map_err(ApplicationError::validation)?
                .into_string();
        }
        if let Some(description) = patch.description {
            novel.description = description;
        }
        if let Some(cover_url) = patch.cover_url {
            novel.cover_url = cover_url;
        }
        if let Some(year) = patch.year {
            novel.year = year;
        }
        if let Some(status) = patch.original_status {
            novel.original_status = status;
        }
        if let Some(status) = patch.translation_status {
            novel.translation_status = status;
        }
        novel.updated_at = Utc::now();

        self.novel_repo.save(&novel).await?;

        if let Some(tags) = patch.tags {
            self.novel_repo.set_tags(novel.id, &tags).await?;
        }
        if let Some(authors) = patch.authors {
            self.novel_repo.set_authors(novel.id, &authors).await?;
        }

        tracing::info!(novel_id = %novel.id, "Novel updated");

        Ok(novel)
    }
}

// ============================================================================
// DeleteNovel
// ============================================================================

/// DeleteNovel Handler - 仅所有者（或管理员）
///
/// 先清理对象存储中的章节正文，再在事务内删除全部关联行。
pub struct DeleteNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    chapter_storage: Arc<dyn ChapterStoragePort>,
}

impl DeleteNovelHandler {
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

    pub async fn handle(&self, command: DeleteNovel) -> Result<(), ApplicationError> {
        let novel = authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::Delete,
            command.novel_id,
        )
        .await?;

        let chapters = self.chapter_repo.find_by_novel(novel.id).await?;
        for chapter in &chapters {
            // 正文清理失败不阻塞删除，残留对象由 key 不可达自然成为垃圾
            if let Err(e) = self.chapter_storage.delete(&chapter.storage_key).await {
                tracing::warn!(
                    chapter_id = %chapter.id,
                    storage_key = %chapter.storage_key,
                    error = %e,
                    "Failed to delete chapter body"
                );
            }
        }

        self.novel_repo.delete(novel.id).await?;

        tracing::info!(
            novel_id = %novel.id,
            title = %novel.title,
            chapters = chapters.len(),
            "Novel deleted"
        );

        Ok(())
    }
}

// ============================================================================
// Share links
// ============================================================================

/// GenerateShareLink Handler - 仅所有者
///
/// is_public 与 share_token 同时置位，保持不变量。
pub struct GenerateShareLinkHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl GenerateShareLinkHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(
        &self,
        command: GenerateShareLink,
    ) -> Result<NovelRecord, ApplicationError> {
        let mut novel = authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::ManageShare,
            command.novel_id,
        )
        .await?;

        let state = ShareState::Shared(ShareToken::generate());
        let (is_public, token) = state.into_columns();
        self.novel_repo
            .set_share(novel.id, is_public, token.as_deref())
            .await?;

        novel.is_public = is_public;
        novel.share_token = token;

        tracing::info!(novel_id = %novel.id, "Share link generated");

        Ok(novel)
    }
}

/// RevokeShareLink Handler - 仅所有者
pub struct RevokeShareLinkHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl RevokeShareLinkHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: RevokeShareLink) -> Result<NovelRecord, ApplicationError> {
        let mut novel = authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::ManageShare,
            command.novel_id,
        )
        .await?;

        let (is_public, token) = ShareState::Private.into_columns();
        self.novel_repo
            .set_share(novel.id, is_public, token.as_deref())
            .await?;

        novel.is_public = is_public;
        novel.share_token = token;

        tracing::info!(novel_id = %novel.id, "Share link revoked");

        Ok(novel)
    }
}

// ============================================================================
// Coauthors
// ============================================================================

/// AddCoauthor Handler - 所有者或管理员
pub struct AddCoauthorHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl AddCoauthorHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        user_repo: Arc<dyn UserRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            user_repo,
        }
    }

    pub async fn handle(&self, command: AddCoauthor) -> Result<(), ApplicationError> {
        let novel = authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::ManageCoauthors,
            command.novel_id,
        )
        .await?;

        // 不变量：合著者集合不含所有者
        if command.user_id == novel.owner_id {
            return Err(ApplicationError::business_rule(
                "owner cannot be added as coauthor",
            ));
        }

        self.user_repo
            .find_by_id(command.user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("User", command.user_id))?;

        self.novel_repo
            .add_coauthor(novel.id, command.user_id)
            .await?;

        tracing::info!(
            novel_id = %novel.id,
            coauthor_id = %command.user_id,
            "Coauthor added"
        );

        Ok(())
    }
}

/// RemoveCoauthor Handler - 所有者或管理员
pub struct RemoveCoauthorHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl RemoveCoauthorHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: RemoveCoauthor) -> Result<(), ApplicationError> {
        let novel = authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::ManageCoauthors,
            command.novel_id,
        )
        .await?;

        self.novel_repo
            .remove_coauthor(novel.id, command.user_id)
            .await?;

        tracing::info!(
            novel_id = %novel.id,
            coauthor_id = %command.user_id,
            "Coauthor removed"
        );

        Ok(())
    }
}
