//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、ChapterStorage、Identity）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - authorization: 服务边界的统一授权入口
//! - error: 应用层错误定义

pub mod authorization;
pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Auth
    TelegramLogin,
    // Chapters
    CreateChapter,
    DeleteChapter,
    ReorderChapters,
    UpdateChapter,
    // Lists
    AddNovelToList,
    CreateList,
    DeleteList,
    RemoveNovelFromList,
    // Novels
    AddCoauthor,
    CreateNovel,
    DeleteNovel,
    GenerateShareLink,
    NovelPatch,
    RemoveCoauthor,
    RevokeShareLink,
    UpdateNovel,
    // Users
    UpdateUserRole,
    // Handlers
    handlers::{
        AddCoauthorHandler, AddNovelToListHandler, CreateChapterHandler, CreateListHandler,
        CreateNovelHandler, DeleteChapterHandler, DeleteListHandler, DeleteNovelHandler,
        GenerateShareLinkHandler, RemoveCoauthorHandler, RemoveNovelFromListHandler,
        ReorderChaptersHandler, RevokeShareLinkHandler, TelegramLoginHandler,
        TelegramLoginResponse, UpdateChapterHandler, UpdateNovelHandler, UpdateUserRoleHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    new_storage_key, AuthClaims, AuthTokenPort, ChapterRecord, ChapterRepositoryPort,
    ChapterStorageError, ChapterStoragePort, IdentityError, IdentityVerifierPort, ListRecord,
    ListRepositoryPort, NovelFilter, NovelRecord, NovelRepositoryPort, RepositoryError,
    UserRecord, UserRepositoryPort, VerifiedTelegramUser,
};

pub use queries::{
    GetChapter, GetLists, GetNovel, GetSharedNovel, ListChapters, ListNovels,
    // Handlers
    handlers::{
        ChapterContentResponse, GetChapterHandler, GetListsHandler, GetNovelHandler,
        GetSharedNovelHandler, ListChaptersHandler, ListNovelsHandler, ListWithNovelsResponse,
        NovelDetailResponse, NovelSummaryResponse,
    },
};
