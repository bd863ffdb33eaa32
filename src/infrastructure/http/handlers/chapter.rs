//! Chapter HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    ChapterRecord, CreateChapter, DeleteChapter, GetChapter, ListChapters, ReorderChapters,
    UpdateChapter,
};
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extractors::{CurrentUser, MaybeUser};
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChapterDto {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub order: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ChapterRecord> for ChapterDto {
    fn from(chapter: ChapterRecord) -> Self {
        Self {
            id: chapter.id,
            novel_id: chapter.novel_id,
            title: chapter.title,
            order: chapter.order,
            created_at: chapter.created_at.to_rfc3339(),
            updated_at: chapter.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterContentDto {
    #[serde(flatten)]
    pub chapter: ChapterDto,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateChapterRequest {
    pub novel_id: Uuid,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateChapterRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderChaptersRequest {
    /// 必须恰好是该小说当前全部章节 id 的一个排列
    pub chapter_ids: Vec<Uuid>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 创建章节（尾部插入）
pub async fn create_chapter(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<CreateChapterRequest>,
) -> Result<Json<ApiResponse<ChapterDto>>, ApiError> {
    let chapter = state
        .create_chapter_handler
        .handle(CreateChapter {
            principal,
            novel_id: request.novel_id,
            title: request.title,
            content: request.content,
        })
        .await?;

    Ok(Json(ApiResponse::success(chapter.into())))
}

/// 章节详情（含正文）
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    MaybeUser(principal): MaybeUser,
    Path(chapter_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ChapterContentDto>>, ApiError> {
    let result = state
        .get_chapter_handler
        .handle(GetChapter {
            principal,
            chapter_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(ChapterContentDto {
        chapter: result.chapter.into(),
        content: result.content,
    })))
}

/// 小说的章节列表（不含正文），按 order 升序
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    MaybeUser(principal): MaybeUser,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ChapterDto>>>, ApiError> {
    let chapters = state
        .list_chapters_handler
        .handle(ListChapters { principal, novel_id })
        .await?;

    Ok(Json(ApiResponse::success(
        chapters.into_iter().map(ChapterDto::from).collect(),
    )))
}

/// 更新章节标题和/或正文
pub async fn update_chapter(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(chapter_id): Path<Uuid>,
    Json(request): Json<UpdateChapterRequest>,
) -> Result<Json<ApiResponse<ChapterDto>>, ApiError> {
    let chapter = state
        .update_chapter_handler
        .handle(UpdateChapter {
            principal,
            chapter_id,
            title: request.title,
            content: request.content,
        })
        .await?;

    Ok(Json(ApiResponse::success(chapter.into())))
}

/// 删除章节（其后的章节序号依次前移）
pub async fn delete_chapter(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(chapter_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_chapter_handler
        .handle(DeleteChapter {
            principal,
            chapter_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 显式全量重排
pub async fn reorder_chapters(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(novel_id): Path<Uuid>,
    Json(request): Json<ReorderChaptersRequest>,
) -> Result<Json<ApiResponse<Vec<ChapterDto>>>, ApiError> {
    let chapters = state
        .reorder_chapters_handler
        .handle(ReorderChapters {
            principal,
            novel_id,
            chapter_ids: request.chapter_ids,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        chapters.into_iter().map(ChapterDto::from).collect(),
    )))
}
