//! Application Commands - CQRS 命令及处理器

mod auth_commands;
mod chapter_commands;
mod list_commands;
mod novel_commands;
mod user_commands;

pub mod handlers;

pub use auth_commands::TelegramLogin;
pub use chapter_commands::{CreateChapter, DeleteChapter, ReorderChapters, UpdateChapter};
pub use list_commands::{AddNovelToList, CreateList, DeleteList, RemoveNovelFromList};
pub use novel_commands::{
    AddCoauthor, CreateNovel, DeleteNovel, GenerateShareLink, NovelPatch, RemoveCoauthor,
    RevokeShareLink, UpdateNovel,
};
pub use user_commands::UpdateUserRole;
