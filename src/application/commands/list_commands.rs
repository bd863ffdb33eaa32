//! List Commands

use uuid::Uuid;

use crate::domain::access::Principal;

/// 创建自定义书单命令
#[derive(Debug, Clone)]
pub struct CreateList {
    pub principal: Principal,
    pub name: String,
}

/// 删除自定义书单命令
#[derive(Debug, Clone)]
pub struct DeleteList {
    pub principal: Principal,
    pub list_id: Uuid,
}

/// 将小说加入书单命令
#[derive(Debug, Clone)]
pub struct AddNovelToList {
    pub principal: Principal,
    pub list_id: Uuid,
    pub novel_id: Uuid,
}

/// 将小说移出书单命令
#[derive(Debug, Clone)]
pub struct RemoveNovelFromList {
    pub principal: Principal,
    pub list_id: Uuid,
    pub novel_id: Uuid,
}
