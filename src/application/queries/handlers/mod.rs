//! Query Handlers

mod chapter_handlers;
mod list_handlers;
mod novel_handlers;

pub use chapter_handlers::{ChapterContentResponse, GetChapterHandler, ListChaptersHandler};
pub use list_handlers::{GetListsHandler, ListWithNovelsResponse};
pub use novel_handlers::{
    GetNovelHandler, GetSharedNovelHandler, ListNovelsHandler, NovelDetailResponse,
    NovelSummaryResponse,
};
