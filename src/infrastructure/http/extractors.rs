//! Auth Extractors - 从 Bearer 令牌还原请求主体
//!
//! 两种提取器：
//! - `CurrentUser`：必须携带有效令牌，否则 401
//! - `MaybeUser`：令牌缺失或无效时降级为匿名主体（分享链接等公开端点用）

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;
use crate::domain::access::Principal;

/// 已认证主体
pub struct CurrentUser(pub Principal);

/// 可能匿名的主体
pub struct MaybeUser(pub Principal);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn principal_from_parts(parts: &Parts, state: &AppState) -> Option<Principal> {
    let token = bearer_token(parts)?;
    let claims = state.auth_tokens.verify(token).ok()?;
    Some(Principal::authenticated(claims.user_id, claims.role))
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match principal_from_parts(parts, state) {
            Some(principal) => Ok(CurrentUser(principal)),
            None => Err(ApiError::Unauthorized(
                "missing or invalid bearer token".to_string(),
            )),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            principal_from_parts(parts, state).unwrap_or_else(Principal::anonymous),
        ))
    }
}
