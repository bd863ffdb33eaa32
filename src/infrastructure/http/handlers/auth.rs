//! Auth HTTP Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{TelegramLogin, UserRecord};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TelegramLoginRequest {
    /// Telegram WebApp 下发的完整 initData 查询串
    pub init_data: String,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub telegram_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl From<UserRecord> for UserDto {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            telegram_id: user.telegram_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar_url: user.avatar_url,
            bio: user.bio,
            role: user.role.as_str().to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserDto,
    pub token: String,
    pub created: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Telegram WebApp 登录
pub async fn telegram_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TelegramLoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state
        .telegram_login_handler
        .handle(TelegramLogin {
            init_data: request.init_data,
        })
        .await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        user: result.user.into(),
        token: result.token,
        created: result.created,
    })))
}
