//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                                 GET    健康检查
//! - /api/auth/telegram                        POST   Telegram WebApp 登录
//! - /api/novels                               POST   创建小说
//! - /api/novels                               GET    我的小说列表（拥有 + 合著）
//! - /api/novels/shared/:token                 GET    分享令牌访问（匿名）
//! - /api/novels/:id                           GET    小说详情
//! - /api/novels/:id                           PATCH  更新小说
//! - /api/novels/:id                           DELETE 删除小说
//! - /api/novels/:id/share                     POST   生成分享链接
//! - /api/novels/:id/share                     DELETE 撤销分享链接
//! - /api/novels/:id/coauthors                 POST   添加合著者
//! - /api/novels/:id/coauthors/:user_id        DELETE 移除合著者
//! - /api/chapters                             POST   创建章节（尾部）
//! - /api/chapters/novel/:novel_id             GET    章节列表（无正文）
//! - /api/chapters/novel/:novel_id/reorder     PUT    显式全量重排
//! - /api/chapters/:id                         GET    章节详情（含正文）
//! - /api/chapters/:id                         PATCH  更新章节
//! - /api/chapters/:id                         DELETE 删除章节（压缩序号）
//! - /api/lists                                GET    我的书单
//! - /api/lists                                POST   创建自定义书单
//! - /api/lists/:id                            DELETE 删除自定义书单
//! - /api/lists/:id/novels/:novel_id           POST   小说加入书单
//! - /api/lists/:id/novels/:novel_id           DELETE 小说移出书单
//! - /api/users/:id/role                       PATCH  修改角色（仅管理员）

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/auth/telegram", post(handlers::telegram_login))
        .nest("/novels", novel_routes())
        .nest("/chapters", chapter_routes())
        .nest("/lists", list_routes())
        .route("/users/:id/role", patch(handlers::update_user_role))
}

/// Novel 路由
fn novel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::create_novel).get(handlers::list_novels))
        .route("/shared/:token", get(handlers::get_shared_novel))
        .route(
            "/:id",
            get(handlers::get_novel)
                .patch(handlers::update_novel)
                .delete(handlers::delete_novel),
        )
        .route(
            "/:id/share",
            post(handlers::generate_share_link).delete(handlers::revoke_share_link),
        )
        .route("/:id/coauthors", post(handlers::add_coauthor))
        .route("/:id/coauthors/:user_id", delete(handlers::remove_coauthor))
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::create_chapter))
        .route("/novel/:novel_id", get(handlers::list_chapters))
        .route(
            "/novel/:novel_id/reorder",
            put(handlers::reorder_chapters),
        )
        .route(
            "/:id",
            get(handlers::get_chapter)
                .patch(handlers::update_chapter)
                .delete(handlers::delete_chapter),
        )
}

/// List 路由
fn list_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::get_lists).post(handlers::create_list))
        .route("/:id", delete(handlers::delete_list))
        .route(
            "/:id/novels/:novel_id",
            post(handlers::add_novel_to_list).delete(handlers::remove_novel_from_list),
        )
}
