//! Chapter Queries

use uuid::Uuid;

use crate::domain::access::Principal;

/// 获取章节及正文
#[derive(Debug, Clone)]
pub struct GetChapter {
    pub principal: Principal,
    pub chapter_id: Uuid,
}

/// 小说的章节列表（不含正文），按 order 升序
#[derive(Debug, Clone)]
pub struct ListChapters {
    pub principal: Principal,
    pub novel_id: Uuid,
}
