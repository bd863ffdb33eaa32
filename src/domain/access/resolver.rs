//! Access Context - 访问决策

use std::collections::HashSet;
use uuid::Uuid;

use super::{Principal, Role};

/// 针对小说的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NovelAction {
    /// 读取小说或其章节
    Read,
    /// 编辑小说元数据、创建/编辑/删除/重排章节
    Write,
    /// 删除整本小说
    Delete,
    /// 生成/撤销分享链接
    ManageShare,
    /// 添加/移除合著者
    ManageCoauthors,
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// 既不是所有者也不是合著者
    NotOwnerOrCoauthor,
    /// 合著者不具备该操作权限（删除/分享管理/合著者管理）
    CoauthorRestricted,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NotOwnerOrCoauthor => "not owner or coauthor",
            DenyReason::CoauthorRestricted => "coauthors may not perform this action",
        }
    }
}

/// 访问决策
///
/// 无权限是一个值而不是错误，调用方自行决定映射为 403 还是 404。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// 小说访问快照
///
/// 不变量:
/// - `share_token` 非空当且仅当 `is_public` 为真（二者同设同清）
/// - `coauthor_ids` 不包含 `owner_id`
#[derive(Debug, Clone)]
pub struct NovelSnapshot {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub is_public: bool,
    pub coauthor_ids: HashSet<Uuid>,
}

impl NovelSnapshot {
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn is_coauthor(&self, user_id: Uuid) -> bool {
        self.coauthor_ids.contains(&user_id)
    }
}

/// 解析一次访问请求
///
/// 规则按优先级匹配，先中先得:
/// 1. 公开小说的读取对任何主体放行（包括匿名分享链接访问；
///    分享令牌本身由外部查询校验，这里只看读出来的 is_public）
/// 2. 所有者放行一切操作
/// 3. 合著者放行读/写
/// 4. 合著者对删除/分享管理/合著者管理显式拒绝
/// 5. 管理员放行除 ManageShare 外的一切操作
/// 6. 其余拒绝
pub fn resolve(principal: Principal, action: NovelAction, novel: &NovelSnapshot) -> AccessDecision {
    if action == NovelAction::Read && novel.is_public {
        return AccessDecision::Allow;
    }

    if let Some(user_id) = principal.id {
        if novel.is_owner(user_id) {
            return AccessDecision::Allow;
        }

        if novel.is_coauthor(user_id) {
            return match action {
                NovelAction::Read | NovelAction::Write => AccessDecision::Allow,
                NovelAction::Delete | NovelAction::ManageShare | NovelAction::ManageCoauthors => {
                    AccessDecision::Deny(DenyReason::CoauthorRestricted)
                }
            };
        }
    }

    if principal.role == Role::Admin && action != NovelAction::ManageShare {
        return AccessDecision::Allow;
    }

    AccessDecision::Deny(DenyReason::NotOwnerOrCoauthor)
}
