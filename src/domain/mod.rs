//! 领域层 - 纯决策逻辑
//!
//! 各限界上下文:
//! - Access Context: 访问控制解析（所有权/合著者/分享/角色）
//! - Ordering Context: 章节稠密排序
//! - Novel Context: 小说值对象（标题、分享状态）
//! - List Context: 书单规则（系统书单、自定义上限）
//!
//! 本层不做任何 I/O，所有函数都是对已读取快照的纯计算。

pub mod access;
pub mod list;
pub mod novel;
pub mod ordering;

pub use access::{resolve, AccessDecision, DenyReason, NovelAction, NovelSnapshot, Principal, Role};
pub use ordering::{next_order, plan_explicit_order, ReorderError};
