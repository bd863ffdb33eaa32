//! Identity Ports - 身份断言与会话令牌
//!
//! 外部身份校验（Telegram WebApp 签名载荷）与 JWT 签发/校验的抽象。
//! 应用层只消费校验完成的结果。

use thiserror::Error;
use uuid::Uuid;

use crate::domain::access::Role;

/// 身份校验错误
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid auth payload: {0}")]
    InvalidPayload(String),

    #[error("Signature verification failed")]
    BadSignature,

    #[error("Auth data expired")]
    Expired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Identity verifier not configured: {0}")]
    NotConfigured(String),
}

/// 校验通过的 Telegram 用户身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTelegramUser {
    pub telegram_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Identity Verifier Port
///
/// 纯计算（HMAC 校验 + 载荷解析），无 I/O。
pub trait IdentityVerifierPort: Send + Sync {
    fn verify(&self, init_data: &str) -> Result<VerifiedTelegramUser, IdentityError>;
}

/// 会话令牌声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
    pub user_id: Uuid,
    pub telegram_id: String,
    pub role: Role,
}

/// Auth Token Port - 会话令牌签发与校验
pub trait AuthTokenPort: Send + Sync {
    fn issue(&self, claims: &AuthClaims) -> Result<String, IdentityError>;

    fn verify(&self, token: &str) -> Result<AuthClaims, IdentityError>;
}
