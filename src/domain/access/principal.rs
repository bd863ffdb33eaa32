//! Access Context - 请求主体

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户角色
///
/// 排序即权限高低，Reader 最低。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Reader,
    Author,
    Coauthor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "READER",
            Role::Author => "AUTHOR",
            Role::Coauthor => "COAUTHOR",
            Role::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "READER" => Some(Role::Reader),
            "AUTHOR" => Some(Role::Author),
            "COAUTHOR" => Some(Role::Coauthor),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// 是否允许创建小说
    pub fn can_create_novels(&self) -> bool {
        matches!(self, Role::Author | Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Reader
    }
}

/// 请求主体
///
/// 匿名主体没有 id，角色固定为最低权限。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Option<Uuid>,
    pub role: Role,
}

impl Principal {
    /// 已认证主体
    pub fn authenticated(id: Uuid, role: Role) -> Self {
        Self { id: Some(id), role }
    }

    /// 匿名主体（例如通过分享链接访问）
    pub fn anonymous() -> Self {
        Self {
            id: None,
            role: Role::Reader,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_lowest_role() {
        let p = Principal::anonymous();
        assert!(p.is_anonymous());
        assert_eq!(p.role, Role::Reader);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Reader, Role::Author, Role::Coauthor, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("SUPERUSER"), None);
    }

    #[test]
    fn test_only_author_and_admin_create_novels() {
        assert!(!Role::Reader.can_create_novels());
        assert!(Role::Author.can_create_novels());
        assert!(!Role::Coauthor.can_create_novels());
        assert!(Role::Admin.can_create_novels());
    }
}
