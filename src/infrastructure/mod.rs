//! 基础设施层
//!
//! 包含：
//! - http: axum HTTP 服务（路由、处理器、DTO、认证提取器）
//! - persistence: SQLite 持久化实现
//! - adapters: 章节正文存储与认证适配器

pub mod adapters;
pub mod http;
pub mod persistence;
