//! Novel HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    AddCoauthor, CreateNovel, DeleteNovel, GenerateShareLink, GetNovel, GetSharedNovel,
    ListNovels, NovelDetailResponse, NovelFilter, NovelPatch, NovelRecord, RemoveCoauthor,
    RevokeShareLink, UpdateNovel,
};
use crate::domain::novel::NovelStatus;
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extractors::{CurrentUser, MaybeUser};
use crate::infrastructure::http::handlers::chapter::ChapterDto;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct NovelDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub original_title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub year: Option<i32>,
    pub original_status: String,
    pub translation_status: String,
    pub is_public: bool,
    /// 只有所有者能看到令牌，应用层已对其他主体抹除
    pub share_token: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<NovelRecord> for NovelDto {
    fn from(novel: NovelRecord) -> Self {
        Self {
            id: novel.id,
            owner_id: novel.owner_id,
            title: novel.title,
            original_title: novel.original_title,
            description: novel.description,
            cover_url: novel.cover_url,
            year: novel.year,
            original_status: novel.original_status.as_str().to_string(),
            translation_status: novel.translation_status.as_str().to_string(),
            is_public: novel.is_public,
            share_token: novel.share_token,
            created_at: novel.created_at.to_rfc3339(),
            updated_at: novel.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NovelDetailDto {
    #[serde(flatten)]
    pub novel: NovelDto,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
    pub coauthor_ids: Vec<Uuid>,
    pub chapters: Vec<ChapterDto>,
}

impl From<NovelDetailResponse> for NovelDetailDto {
    fn from(detail: NovelDetailResponse) -> Self {
        Self {
            novel: detail.novel.into(),
            tags: detail.tags,
            authors: detail.authors,
            coauthor_ids: detail.coauthor_ids,
            chapters: detail.chapters.into_iter().map(ChapterDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NovelSummaryDto {
    #[serde(flatten)]
    pub novel: NovelDto,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
    pub chapter_count: u32,
    pub coauthored: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateNovelRequest {
    pub title: String,
    pub original_title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub year: Option<i32>,
    pub original_status: Option<String>,
    pub translation_status: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// 区分「字段缺失」与「显式 null」：缺失保持不变，null 清空
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// PATCH 请求体：缺失的字段保持不变，显式 null 清空可空字段
#[derive(Debug, Deserialize)]
pub struct UpdateNovelRequest {
    pub title: Option<String>,
    pub original_title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i32>>,
    pub original_status: Option<String>,
    pub translation_status: Option<String>,
    pub tags: Option<Vec<String>>,
    pub authors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListNovelsQuery {
    pub title: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddCoauthorRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    pub novel_id: Uuid,
    pub is_public: bool,
    pub share_token: Option<String>,
}

fn parse_status(value: Option<String>, field: &str) -> Result<Option<NovelStatus>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => NovelStatus::from_str(&raw)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("invalid {}: {}", field, raw))),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// 创建小说
pub async fn create_novel(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<CreateNovelRequest>,
) -> Result<Json<ApiResponse<NovelDto>>, ApiError> {
    let original_status =
        parse_status(request.original_status, "original_status")?.unwrap_or_default();
    let translation_status =
        parse_status(request.translation_status, "translation_status")?.unwrap_or_default();

    let novel = state
        .create_novel_handler
        .handle(CreateNovel {
            principal,
            title: request.title,
            original_title: request.original_title,
            description: request.description,
            cover_url: request.cover_url,
            year: request.year,
            original_status,
            translation_status,
            tags: request.tags,
            authors: request.authors,
        })
        .await?;

    Ok(Json(ApiResponse::success(novel.into())))
}

/// 我的小说列表（拥有的 + 合著的）
pub async fn list_novels(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<ListNovelsQuery>,
) -> Result<Json<ApiResponse<Vec<NovelSummaryDto>>>, ApiError> {
    let summaries = state
        .list_novels_handler
        .handle(ListNovels {
            principal,
            filter: NovelFilter {
                title: query.title,
                sort_by: query.sort_by,
            },
        })
        .await?;

    let items = summaries
        .into_iter()
        .map(|s| NovelSummaryDto {
            novel: s.novel.into(),
            tags: s.tags,
            authors: s.authors,
            chapter_count: s.chapter_count,
            coauthored: s.coauthored,
        })
        .collect();

    Ok(Json(ApiResponse::success(items)))
}

/// 小说详情
pub async fn get_novel(
    State(state): State<Arc<AppState>>,
    MaybeUser(principal): MaybeUser,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<NovelDetailDto>>, ApiError> {
    let detail = state
        .get_novel_handler
        .handle(GetNovel { principal, novel_id })
        .await?;

    Ok(Json(ApiResponse::success(detail.into())))
}

/// 通过分享令牌访问公开小说（匿名）
pub async fn get_shared_novel(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<NovelDetailDto>>, ApiError> {
    let detail = state
        .get_shared_novel_handler
        .handle(GetSharedNovel { token })
        .await?;

    Ok(Json(ApiResponse::success(detail.into())))
}

/// 更新小说元数据
pub async fn update_novel(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(novel_id): Path<Uuid>,
    Json(request): Json<UpdateNovelRequest>,
) -> Result<Json<ApiResponse<NovelDto>>, ApiError> {
    let patch = NovelPatch {
        title: request.title,
        original_title: request.original_title,
        description: request.description,
        cover_url: request.cover_url,
        year: request.year,
        original_status: parse_status(request.original_status, "original_status")?,
        translation_status: parse_status(request.translation_status, "translation_status")?,
        tags: request.tags,
        authors: request.authors,
    };

    let novel = state
        .update_novel_handler
        .handle(UpdateNovel {
            principal,
            novel_id,
            patch,
        })
        .await?;

    Ok(Json(ApiResponse::success(novel.into())))
}

/// 删除小说
pub async fn delete_novel(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_novel_handler
        .handle(DeleteNovel { principal, novel_id })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 生成分享链接
pub async fn generate_share_link(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ShareLinkResponse>>, ApiError> {
    let novel = state
        .generate_share_link_handler
        .handle(GenerateShareLink { principal, novel_id })
        .await?;

    Ok(Json(ApiResponse::success(ShareLinkResponse {
        novel_id: novel.id,
        is_public: novel.is_public,
        share_token: novel.share_token,
    })))
}

/// 撤销分享链接
pub async fn revoke_share_link(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ShareLinkResponse>>, ApiError> {
    let novel = state
        .revoke_share_link_handler
        .handle(RevokeShareLink { principal, novel_id })
        .await?;

    Ok(Json(ApiResponse::success(ShareLinkResponse {
        novel_id: novel.id,
        is_public: novel.is_public,
        share_token: novel.share_token,
    })))
}

/// 添加合著者
pub async fn add_coauthor(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(novel_id): Path<Uuid>,
    Json(request): Json<AddCoauthorRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .add_coauthor_handler
        .handle(AddCoauthor {
            principal,
            novel_id,
            user_id: request.user_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 移除合著者
pub async fn remove_coauthor(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path((novel_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .remove_coauthor_handler
        .handle(RemoveCoauthor {
            principal,
            novel_id,
            user_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}
