//! Access Context - 访问控制限界上下文
//!
//! 职责:
//! - 请求主体（Principal）与角色定义
//! - 小说级访问决策（所有者/合著者/公开分享/管理员）
//!
//! 章节没有独立的权限字段，章节操作一律通过父小说快照解析。

mod principal;
mod resolver;

pub use principal::{Principal, Role};
pub use resolver::{resolve, AccessDecision, DenyReason, NovelAction, NovelSnapshot};
