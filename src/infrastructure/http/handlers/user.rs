//! User HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::UpdateUserRole;
use crate::domain::access::Role;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extractors::CurrentUser;
use crate::infrastructure::http::handlers::auth::UserDto;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// 修改用户角色（仅管理员）
pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let role = Role::from_str(&request.role)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid role: {}", request.role)))?;

    let user = state
        .update_user_role_handler
        .handle(UpdateUserRole {
            principal,
            user_id,
            role,
        })
        .await?;

    Ok(Json(ApiResponse::success(user.into())))
}
