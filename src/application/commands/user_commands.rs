//! User Commands

use uuid::Uuid;

use crate::domain::access::{Principal, Role};

/// 修改用户角色命令（仅管理员）
#[derive(Debug, Clone)]
pub struct UpdateUserRole {
    pub principal: Principal,
    pub user_id: Uuid,
    pub role: Role,
}
