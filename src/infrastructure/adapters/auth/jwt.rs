//! JWT Token Service - 会话令牌签发与校验
//!
//! 实现 AuthTokenPort trait

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::{AuthClaims, AuthTokenPort, IdentityError};
use crate::domain::access::Role;

/// 默认令牌有效期（小时）
const DEFAULT_TTL_HOURS: i64 = 24 * 7;

/// JWT 载荷
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// 用户 id
    sub: Uuid,
    /// Telegram id
    tid: String,
    /// 签发时刻的角色快照
    role: String,
    exp: i64,
    iat: i64,
}

/// JWT 会话令牌服务
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

impl JwtTokenService {
    pub fn new(secret: &str) -> Result<Self, IdentityError> {
        if secret.is_empty() {
            return Err(IdentityError::NotConfigured("jwt secret is empty".into()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours: DEFAULT_TTL_HOURS,
        })
    }

    pub fn with_ttl_hours(mut self, hours: i64) -> Self {
        self.ttl_hours = hours;
        self
    }
}

impl AuthTokenPort for JwtTokenService {
    fn issue(&self, claims: &AuthClaims) -> Result<String, IdentityError> {
        let now = Utc::now();
        let payload = Claims {
            sub: claims.user_id,
            tid: claims.telegram_id.clone(),
            role: claims.role.as_str().to_string(),
            exp: (now + Duration::hours(self.ttl_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &payload, &self.encoding_key)
            .map_err(|e| IdentityError::InvalidPayload(format!("token encoding failed: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<AuthClaims, IdentityError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| IdentityError::InvalidToken)?;

        let role = Role::from_str(&data.claims.role).ok_or(IdentityError::InvalidToken)?;

        Ok(AuthClaims {
            user_id: data.claims.sub,
            telegram_id: data.claims.tid,
            role,
        })
    }
}
