//! List HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    AddNovelToList, CreateList, DeleteList, GetLists, ListRecord, RemoveNovelFromList,
};
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extractors::CurrentUser;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ListDto {
    pub id: Uuid,
    pub name: String,
    pub is_system: bool,
    pub position: u32,
    pub novel_ids: Vec<Uuid>,
}

fn list_dto(list: ListRecord, novel_ids: Vec<Uuid>) -> ListDto {
    ListDto {
        id: list.id,
        name: list.name,
        is_system: list.is_system,
        position: list.position,
        novel_ids,
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// 当前用户的全部书单
pub async fn get_lists(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<ApiResponse<Vec<ListDto>>>, ApiError> {
    let lists = state.get_lists_handler.handle(GetLists { principal }).await?;

    Ok(Json(ApiResponse::success(
        lists
            .into_iter()
            .map(|entry| list_dto(entry.list, entry.novel_ids))
            .collect(),
    )))
}

/// 创建自定义书单
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<CreateListRequest>,
) -> Result<Json<ApiResponse<ListDto>>, ApiError> {
    let list = state
        .create_list_handler
        .handle(CreateList {
            principal,
            name: request.name,
        })
        .await?;

    Ok(Json(ApiResponse::success(list_dto(list, Vec::new()))))
}

/// 删除自定义书单
pub async fn delete_list(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(list_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_list_handler
        .handle(DeleteList { principal, list_id })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 将小说加入书单
pub async fn add_novel_to_list(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path((list_id, novel_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .add_novel_to_list_handler
        .handle(AddNovelToList {
            principal,
            list_id,
            novel_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 将小说移出书单
pub async fn remove_novel_from_list(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path((list_id, novel_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .remove_novel_from_list_handler
        .handle(RemoveNovelFromList {
            principal,
            list_id,
            novel_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}
