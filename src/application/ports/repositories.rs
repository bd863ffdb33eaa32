//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::access::Role;
use crate::domain::novel::NovelStatus;
use crate::domain::ordering::OrderAssignment;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    /// 排序唯一约束冲突（并发插入/重排竞争），调用方可有界重试
    #[error("Ordering conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// User Repository
// ============================================================================

/// 用户实体（用于持久化）
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub telegram_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User Repository Port
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    /// 保存用户（插入或按 id 更新）
    async fn save(&self, user: &UserRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError>;

    /// 根据 Telegram ID 查找用户
    async fn find_by_telegram_id(
        &self,
        telegram_id: &str,
    ) -> Result<Option<UserRecord>, RepositoryError>;

    /// 更新用户角色
    async fn update_role(&self, id: Uuid, role: Role) -> Result<(), RepositoryError>;
}

// ============================================================================
// Novel Repository
// ============================================================================

/// 小说实体（用于持久化）
#[derive(Debug, Clone)]
pub struct NovelRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub original_title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub year: Option<i32>,
    pub original_status: NovelStatus,
    pub translation_status: NovelStatus,
    pub is_public: bool,
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 小说列表过滤条件
#[derive(Debug, Clone, Default)]
pub struct NovelFilter {
    /// 标题子串（不区分大小写）
    pub title: Option<String>,
    /// "year" 按年份倒序，其余按标题
    pub sort_by: Option<String>,
}

/// Novel Repository Port
#[async_trait]
pub trait NovelRepositoryPort: Send + Sync {
    /// 保存小说（插入或按 id 更新）
    async fn save(&self, novel: &NovelRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找小说
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError>;

    /// 根据分享令牌查找公开小说
    async fn find_by_share_token(
        &self,
        token: &str,
    ) -> Result<Option<NovelRecord>, RepositoryError>;

    /// 某用户拥有的小说
    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        filter: &NovelFilter,
    ) -> Result<Vec<NovelRecord>, RepositoryError>;

    /// 某用户参与合著的小说
    async fn find_coauthored(&self, user_id: Uuid) -> Result<Vec<NovelRecord>, RepositoryError>;

    /// 删除小说及其所有关联行（章节、合著者、标签、书单关联），事务内完成
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 设置分享列（is_public 与 share_token 必须同设同清）
    async fn set_share(
        &self,
        id: Uuid,
        is_public: bool,
        share_token: Option<&str>,
    ) -> Result<(), RepositoryError>;

    /// 添加合著者，重复添加返回 Duplicate
    async fn add_coauthor(&self, novel_id: Uuid, user_id: Uuid) -> Result<(), RepositoryError>;

    /// 移除合著者
    async fn remove_coauthor(&self, novel_id: Uuid, user_id: Uuid) -> Result<(), RepositoryError>;

    /// 小说的合著者 id 集合
    async fn find_coauthors(&self, novel_id: Uuid) -> Result<Vec<Uuid>, RepositoryError>;

    /// 替换小说的标签集合（按名称 upsert）
    async fn set_tags(&self, novel_id: Uuid, tags: &[String]) -> Result<(), RepositoryError>;

    /// 替换小说的原作者集合（按名称 upsert）
    async fn set_authors(&self, novel_id: Uuid, authors: &[String]) -> Result<(), RepositoryError>;

    /// 小说的标签名
    async fn find_tags(&self, novel_id: Uuid) -> Result<Vec<String>, RepositoryError>;

    /// 小说的原作者名
    async fn find_authors(&self, novel_id: Uuid) -> Result<Vec<String>, RepositoryError>;
}

// ============================================================================
// Chapter Repository
// ============================================================================

/// 章节实体（用于持久化）
///
/// 章节没有独立的 owner 字段，所有权经由父小说解析。
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub order: u32,
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chapter Repository Port
///
/// 实现必须在 (novel_id, order) 上维持唯一约束，
/// 并发竞争产生的冲突以 `RepositoryError::Conflict` 上报。
#[async_trait]
pub trait ChapterRepositoryPort: Send + Sync {
    /// 插入新章节，序号冲突返回 Conflict
    async fn insert(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找章节
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError>;

    /// 小说的全部章节，按 order 升序
    async fn find_by_novel(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError>;

    /// 小说当前最大序号，无章节时为 None
    async fn max_order(&self, novel_id: Uuid) -> Result<Option<u32>, RepositoryError>;

    /// 更新章节标题
    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), RepositoryError>;

    /// 仅刷新 updated_at（正文存于对象存储，行上只需跟进时间戳）
    async fn touch(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 删除章节并压缩序号：order > 被删章节的行依次减一，单事务完成
    async fn remove_and_compact(
        &self,
        novel_id: Uuid,
        chapter_id: Uuid,
    ) -> Result<(), RepositoryError>;

    /// 应用显式全量重排，单事务完成；冲突返回 Conflict
    async fn apply_order(
        &self,
        novel_id: Uuid,
        assignments: &[OrderAssignment],
    ) -> Result<(), RepositoryError>;
}

// ============================================================================
// List Repository
// ============================================================================

/// 书单实体（用于持久化）
#[derive(Debug, Clone)]
pub struct ListRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub is_system: bool,
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

/// List Repository Port
#[async_trait]
pub trait ListRepositoryPort: Send + Sync {
    /// 为新用户创建全部系统书单
    async fn create_system_lists(&self, user_id: Uuid) -> Result<(), RepositoryError>;

    /// 插入自定义书单，重名返回 Duplicate
    async fn insert(&self, list: &ListRecord) -> Result<(), RepositoryError>;

    /// 用户的全部书单，按 position 升序
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<ListRecord>, RepositoryError>;

    /// 根据 ID 查找书单
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ListRecord>, RepositoryError>;

    /// 用户的自定义书单数量
    async fn count_custom(&self, user_id: Uuid) -> Result<usize, RepositoryError>;

    /// 删除书单及其小说关联
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 将小说加入书单，重复加入返回 Duplicate
    async fn add_novel(&self, list_id: Uuid, novel_id: Uuid) -> Result<(), RepositoryError>;

    /// 将小说移出书单
    async fn remove_novel(&self, list_id: Uuid, novel_id: Uuid) -> Result<(), RepositoryError>;

    /// 书单内的小说 id
    async fn find_novel_ids(&self, list_id: Uuid) -> Result<Vec<Uuid>, RepositoryError>;
}
