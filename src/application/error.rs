//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;
use uuid::Uuid;

/// 应用层错误
///
/// 所有变体都限定在单次请求范围内，没有进程级致命错误。
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到（含为避免泄露存在性而被掩蔽的读取拒绝）
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    /// 未认证
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 策略拒绝
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 验证错误（含重排集合不匹配，永不重试）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 业务规则违反
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    /// 存储层排序竞争，有界重试后仍失败
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 对象存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource_type, id }
    }

    /// 创建未认证错误
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// 创建策略拒绝错误
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建业务规则违反错误
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<crate::application::ports::RepositoryError> for ApplicationError {
    fn from(err: crate::application::ports::RepositoryError) -> Self {
        use crate::application::ports::RepositoryError;
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::Duplicate(msg) => Self::BusinessRuleViolation(msg),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<crate::application::ports::ChapterStorageError> for ApplicationError {
    fn from(err: crate::application::ports::ChapterStorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<crate::application::ports::IdentityError> for ApplicationError {
    fn from(err: crate::application::ports::IdentityError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}
