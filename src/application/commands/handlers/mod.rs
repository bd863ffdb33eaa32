//! Command Handlers

mod auth_handlers;
mod chapter_handlers;
mod list_handlers;
mod novel_handlers;
mod user_handlers;

pub use auth_handlers::{TelegramLoginHandler, TelegramLoginResponse};
pub use chapter_handlers::{
    CreateChapterHandler, DeleteChapterHandler, ReorderChaptersHandler, UpdateChapterHandler,
};
pub use list_handlers::{
    AddNovelToListHandler, CreateListHandler, DeleteListHandler, RemoveNovelFromListHandler,
};
pub use novel_handlers::{
    AddCoauthorHandler, CreateNovelHandler, DeleteNovelHandler, GenerateShareLinkHandler,
    RemoveCoauthorHandler, RevokeShareLinkHandler, UpdateNovelHandler,
};
pub use user_handlers::UpdateUserRoleHandler;
