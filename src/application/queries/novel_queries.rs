//! Novel Queries

use uuid::Uuid;

use crate::application::ports::NovelFilter;
use crate::domain::access::Principal;

/// 获取小说详情
#[derive(Debug, Clone)]
pub struct GetNovel {
    pub principal: Principal,
    pub novel_id: Uuid,
}

/// 我的小说列表（拥有的 + 合著的）
#[derive(Debug, Clone)]
pub struct ListNovels {
    pub principal: Principal,
    pub filter: NovelFilter,
}

/// 通过分享令牌获取公开小说（匿名可用）
#[derive(Debug, Clone)]
pub struct GetSharedNovel {
    pub token: String,
}
