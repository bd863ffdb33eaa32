//! Chapter Commands

use uuid::Uuid;

use crate::domain::access::Principal;

/// 创建章节命令（尾部插入）
#[derive(Debug, Clone)]
pub struct CreateChapter {
    pub principal: Principal,
    pub novel_id: Uuid,
    pub title: String,
    pub content: String,
}

/// 更新章节命令
#[derive(Debug, Clone)]
pub struct UpdateChapter {
    pub principal: Principal,
    pub chapter_id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// 删除章节命令（删除后压缩序号）
#[derive(Debug, Clone)]
pub struct DeleteChapter {
    pub principal: Principal,
    pub chapter_id: Uuid,
}

/// 显式全量重排命令
#[derive(Debug, Clone)]
pub struct ReorderChapters {
    pub principal: Principal,
    pub novel_id: Uuid,
    /// 必须恰好是该小说当前全部章节 id 的一个排列
    pub chapter_ids: Vec<Uuid>,
}
