//! Application Queries - CQRS 查询及处理器

mod chapter_queries;
mod list_queries;
mod novel_queries;

pub mod handlers;

pub use chapter_queries::{GetChapter, ListChapters};
pub use list_queries::GetLists;
pub use novel_queries::{GetNovel, GetSharedNovel, ListNovels};
