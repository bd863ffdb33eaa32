//! Saltfish - 翻译连载小说发布与追踪系统
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Access Context: 主体、角色与访问解析
//! - Novel Context: 小说值对象（标题、分享状态、连载状态）
//! - Ordering Context: 章节稠密序号计算
//! - List Context: 书单规则
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories, ChapterStorage, Identity）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API（axum，errno 响应信封，Bearer 认证提取器）
//! - Persistence: SQLite 存储
//! - Adapters: 章节正文存储（本地/远端网关）、Telegram 登录校验、JWT

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
