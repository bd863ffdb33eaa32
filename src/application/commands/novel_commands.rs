//! Novel Commands

use uuid::Uuid;

use crate::domain::access::Principal;
use crate::domain::novel::NovelStatus;

/// 创建小说命令
#[derive(Debug, Clone)]
pub struct CreateNovel {
    pub principal: Principal,
    pub title: String,
    pub original_title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub year: Option<i32>,
    pub original_status: NovelStatus,
    pub translation_status: NovelStatus,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
}

/// 更新小说元数据命令（未提供的字段保持不变）
#[derive(Debug, Clone, Default)]
pub struct NovelPatch {
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub description: Option<Option<String>>,
    pub cover_url: Option<Option<String>>,
    pub year: Option<Option<i32>>,
    pub original_status: Option<NovelStatus>,
    pub translation_status: Option<NovelStatus>,
    pub tags: Option<Vec<String>>,
    pub authors: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct UpdateNovel {
    pub principal: Principal,
    pub novel_id: Uuid,
    pub patch: NovelPatch,
}

/// 删除小说命令
#[derive(Debug, Clone)]
pub struct DeleteNovel {
    pub principal: Principal,
    pub novel_id: Uuid,
}

/// 生成分享链接命令
#[derive(Debug, Clone)]
pub struct GenerateShareLink {
    pub principal: Principal,
    pub novel_id: Uuid,
}

/// 撤销分享链接命令
#[derive(Debug, Clone)]
pub struct RevokeShareLink {
    pub principal: Principal,
    pub novel_id: Uuid,
}

/// 添加合著者命令
#[derive(Debug, Clone)]
pub struct AddCoauthor {
    pub principal: Principal,
    pub novel_id: Uuid,
    pub user_id: Uuid,
}

/// 移除合著者命令
#[derive(Debug, Clone)]
pub struct RemoveCoauthor {
    pub principal: Principal,
    pub novel_id: Uuid,
    pub user_id: Uuid,
}
