//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    AddCoauthorHandler, AddNovelToListHandler, CreateChapterHandler, CreateListHandler,
    CreateNovelHandler, DeleteChapterHandler, DeleteListHandler, DeleteNovelHandler,
    GenerateShareLinkHandler, RemoveCoauthorHandler, RemoveNovelFromListHandler,
    ReorderChaptersHandler, RevokeShareLinkHandler, TelegramLoginHandler, UpdateChapterHandler,
    UpdateNovelHandler, UpdateUserRoleHandler,
    // Query handlers
    GetChapterHandler, GetListsHandler, GetNovelHandler, GetSharedNovelHandler,
    ListChaptersHandler, ListNovelsHandler,
    // Ports
    AuthTokenPort, ChapterRepositoryPort, ChapterStoragePort, IdentityVerifierPort,
    ListRepositoryPort, NovelRepositoryPort, UserRepositoryPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub user_repo: Arc<dyn UserRepositoryPort>,
    pub novel_repo: Arc<dyn NovelRepositoryPort>,
    pub chapter_repo: Arc<dyn ChapterRepositoryPort>,
    pub list_repo: Arc<dyn ListRepositoryPort>,
    pub chapter_storage: Arc<dyn ChapterStoragePort>,
    pub identity_verifier: Arc<dyn IdentityVerifierPort>,
    pub auth_tokens: Arc<dyn AuthTokenPort>,

    // ========== Command Handlers ==========
    pub telegram_login_handler: TelegramLoginHandler,
    pub create_novel_handler: CreateNovelHandler,
    pub update_novel_handler: UpdateNovelHandler,
    pub delete_novel_handler: DeleteNovelHandler,
    pub generate_share_link_handler: GenerateShareLinkHandler,
    pub revoke_share_link_handler: RevokeShareLinkHandler,
    pub add_coauthor_handler: AddCoauthorHandler,
    pub remove_coauthor_handler: RemoveCoauthorHandler,
    pub create_chapter_handler: CreateChapterHandler,
    pub update_chapter_handler: UpdateChapterHandler,
    pub delete_chapter_handler: DeleteChapterHandler,
    pub reorder_chapters_handler: ReorderChaptersHandler,
    pub create_list_handler: CreateListHandler,
    pub delete_list_handler: DeleteListHandler,
    pub add_novel_to_list_handler: AddNovelToListHandler,
    pub remove_novel_from_list_handler: RemoveNovelFromListHandler,
    pub update_user_role_handler: UpdateUserRoleHandler,

    // ========== Query Handlers ==========
    pub get_novel_handler: GetNovelHandler,
    pub list_novels_handler: ListNovelsHandler,
    pub get_shared_novel_handler: GetSharedNovelHandler,
    pub get_chapter_handler: GetChapterHandler,
    pub list_chapters_handler: ListChaptersHandler,
    pub get_lists_handler: GetListsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        list_repo: Arc<dyn ListRepositoryPort>,
        chapter_storage: Arc<dyn ChapterStoragePort>,
        identity_verifier: Arc<dyn IdentityVerifierPort>,
        auth_tokens: Arc<dyn AuthTokenPort>,
    ) -> Self {
        Self {
            // Ports
            user_repo: user_repo.clone(),
            novel_repo: novel_repo.clone(),
            chapter_repo: chapter_repo.clone(),
            list_repo: list_repo.clone(),
            chapter_storage: chapter_storage.clone(),
            identity_verifier: identity_verifier.clone(),
            auth_tokens: auth_tokens.clone(),

            // Command handlers
            telegram_login_handler: TelegramLoginHandler::new(
                identity_verifier.clone(),
                auth_tokens.clone(),
                user_repo.clone(),
                list_repo.clone(),
            ),
            create_novel_handler: CreateNovelHandler::new(novel_repo.clone()),
            update_novel_handler: UpdateNovelHandler::new(novel_repo.clone()),
            delete_novel_handler: DeleteNovelHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                chapter_storage.clone(),
            ),
            generate_share_link_handler: GenerateShareLinkHandler::new(novel_repo.clone()),
            revoke_share_link_handler: RevokeShareLinkHandler::new(novel_repo.clone()),
            add_coauthor_handler: AddCoauthorHandler::new(novel_repo.clone(), user_repo.clone()),
            remove_coauthor_handler: RemoveCoauthorHandler::new(novel_repo.clone()),
            create_chapter_handler: CreateChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                chapter_storage.clone(),
            ),
            update_chapter_handler: UpdateChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                chapter_storage.clone(),
            ),
            delete_chapter_handler: DeleteChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                chapter_storage.clone(),
            ),
            reorder_chapters_handler: ReorderChaptersHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            create_list_handler: CreateListHandler::new(list_repo.clone()),
            delete_list_handler: DeleteListHandler::new(list_repo.clone()),
            add_novel_to_list_handler: AddNovelToListHandler::new(
                list_repo.clone(),
                novel_repo.clone(),
            ),
            remove_novel_from_list_handler: RemoveNovelFromListHandler::new(list_repo.clone()),
            update_user_role_handler: UpdateUserRoleHandler::new(user_repo.clone()),

            // Query handlers
            get_novel_handler: GetNovelHandler::new(novel_repo.clone(), chapter_repo.clone()),
            list_novels_handler: ListNovelsHandler::new(novel_repo.clone(), chapter_repo.clone()),
            get_shared_novel_handler: GetSharedNovelHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            get_chapter_handler: GetChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                chapter_storage.clone(),
            ),
            list_chapters_handler: ListChaptersHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            get_lists_handler: GetListsHandler::new(list_repo.clone()),
        }
    }
}
