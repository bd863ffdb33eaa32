//! SQLite Novel Repository

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use super::user_repo::parse_timestamp;
use super::DbPool;
use crate::application::ports::{
    NovelFilter, NovelRecord, NovelRepositoryPort, RepositoryError,
};
use crate::domain::novel::{NovelStatus, ShareState};

/// SQLite Novel Repository
pub struct SqliteNovelRepository {
    pool: DbPool,
}

impl SqliteNovelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NovelRow {
    id: String,
    owner_id: String,
    title: String,
    original_title: String,
    description: Option<String>,
    cover_url: Option<String>,
    year: Option<i32>,
    original_status: String,
    translation_status: String,
    is_public: i64,
    share_token: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<NovelRow> for NovelRecord {
    type Error = RepositoryError;

    fn try_from(row: NovelRow) -> Result<Self, Self::Error> {
        // 分享两列必须同设同清，非法组合视为数据损坏
        let share = ShareState::from_columns(row.is_public != 0, row.share_token)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        let (is_public, share_token) = share.into_columns();

        Ok(NovelRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            owner_id: Uuid::parse_str(&row.owner_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            title: row.title,
            original_title: row.original_title,
            description: row.description,
            cover_url: row.cover_url,
            year: row.year,
            original_status: NovelStatus::from_str(&row.original_status).unwrap_or_default(),
            translation_status: NovelStatus::from_str(&row.translation_status).unwrap_or_default(),
            is_public,
            share_token,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

const NOVEL_COLUMNS: &str = "id, owner_id, title, original_title, description, cover_url, year, \
     original_status, translation_status, is_public, share_token, created_at, updated_at";

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl NovelRepositoryPort for SqliteNovelRepository {
    async fn save(&self, novel: &NovelRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO novels (id, owner_id, title, original_title, description, cover_url, year,
                                original_status, translation_status, is_public, share_token,
                                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                original_title = excluded.original_title,
                description = excluded.description,
                cover_url = excluded.cover_url,
                year = excluded.year,
                original_status = excluded.original_status,
                translation_status = excluded.translation_status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(novel.id.to_string())
        .bind(novel.owner_id.to_string())
        .bind(&novel.title)
        .bind(&novel.original_title)
        .bind(&novel.description)
        .bind(&novel.cover_url)
        .bind(novel.year)
        .bind(novel.original_status.as_str())
        .bind(novel.translation_status.as_str())
        .bind(novel.is_public as i64)
        .bind(&novel.share_token)
        .bind(novel.created_at.to_rfc3339())
        .bind(novel.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError> {
        let row: Option<NovelRow> = sqlx::query_as(&format!(
            "SELECT {} FROM novels WHERE id = ?",
            NOVEL_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(NovelRecord::try_from).transpose()
    }

    async fn find_by_share_token(
        &self,
        token: &str,
    ) -> Result<Option<NovelRecord>, RepositoryError> {
        let row: Option<NovelRow> = sqlx::query_as(&format!(
            "SELECT {} FROM novels WHERE share_token = ? AND is_public = 1",
            NOVEL_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(NovelRecord::try_from).transpose()
    }

    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        filter: &NovelFilter,
    ) -> Result<Vec<NovelRecord>, RepositoryError> {
        let order_clause = match filter.sort_by.as_deref() {
            Some("year") => "ORDER BY year DESC",
            _ => "ORDER BY title COLLATE NOCASE ASC",
        };

        let rows: Vec<NovelRow> = if let Some(title) = &filter.title {
            sqlx::query_as(&format!(
                "SELECT {} FROM novels WHERE owner_id = ? AND title LIKE ? COLLATE NOCASE {}",
                NOVEL_COLUMNS, order_clause
            ))
            .bind(owner_id.to_string())
            .bind(format!("%{}%", title))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
        } else {
            sqlx::query_as(&format!(
                "SELECT {} FROM novels WHERE owner_id = ? {}",
                NOVEL_COLUMNS, order_clause
            ))
            .bind(owner_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
        };

        rows.into_iter().map(NovelRecord::try_from).collect()
    }

    async fn find_coauthored(&self, user_id: Uuid) -> Result<Vec<NovelRecord>, RepositoryError> {
        let rows: Vec<NovelRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM novels n
            INNER JOIN novel_coauthors nc ON nc.novel_id = n.id
            WHERE nc.user_id = ?
            ORDER BY n.title COLLATE NOCASE ASC
            "#,
            "n.id, n.owner_id, n.title, n.original_title, n.description, n.cover_url, n.year, \
             n.original_status, n.translation_status, n.is_public, n.share_token, n.created_at, n.updated_at"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(NovelRecord::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let novel_id = id.to_string();

        sqlx::query("DELETE FROM list_novels WHERE novel_id = ?")
            .bind(&novel_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM novel_tags WHERE novel_id = ?")
            .bind(&novel_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM novel_authors WHERE novel_id = ?")
            .bind(&novel_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM novel_coauthors WHERE novel_id = ?")
            .bind(&novel_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM chapters WHERE novel_id = ?")
            .bind(&novel_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let result = sqlx::query("DELETE FROM novels WHERE id = ?")
            .bind(&novel_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("novel {}", id)));
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn set_share(
        &self,
        id: Uuid,
        is_public: bool,
        share_token: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE novels SET is_public = ?, share_token = ?, updated_at = ? WHERE id = ?",
        )
        .bind(is_public as i64)
        .bind(share_token)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("novel {}", id)));
        }

        Ok(())
    }

    async fn add_coauthor(&self, novel_id: Uuid, user_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("INSERT INTO novel_coauthors (novel_id, user_id) VALUES (?, ?)")
            .bind(novel_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => Err(
                RepositoryError::Duplicate(format!("coauthor {} on novel {}", user_id, novel_id)),
            ),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn remove_coauthor(&self, novel_id: Uuid, user_id: Uuid) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM novel_coauthors WHERE novel_id = ? AND user_id = ?")
                .bind(novel_id.to_string())
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "coauthor {} on novel {}",
                user_id, novel_id
            )));
        }

        Ok(())
    }

    async fn find_coauthors(&self, novel_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT user_id FROM novel_coauthors WHERE novel_id = ?")
                .bind(novel_id.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        rows.into_iter()
            .map(|(id,)| {
                Uuid::parse_str(&id)
                    .map_err(|e| RepositoryError::SerializationError(e.to_string()))
            })
            .collect()
    }

    async fn set_tags(&self, novel_id: Uuid, tags: &[String]) -> Result<(), RepositoryError> {
        replace_named_links(
            &self.pool,
            novel_id,
            tags,
            "tags",
            "novel_tags",
            "tag_id",
        )
        .await
    }

    async fn set_authors(&self, novel_id: Uuid, authors: &[String]) -> Result<(), RepositoryError> {
        replace_named_links(
            &self.pool,
            novel_id,
            authors,
            "authors",
            "novel_authors",
            "author_id",
        )
        .await
    }

    async fn find_tags(&self, novel_id: Uuid) -> Result<Vec<String>, RepositoryError> {
        find_linked_names(&self.pool, novel_id, "tags", "novel_tags", "tag_id").await
    }

    async fn find_authors(&self, novel_id: Uuid) -> Result<Vec<String>, RepositoryError> {
        find_linked_names(&self.pool, novel_id, "authors", "novel_authors", "author_id").await
    }
}

/// 事务内整体替换名称关联：按名 upsert 字典表，清空后重建关联行
async fn replace_named_links(
    pool: &DbPool,
    novel_id: Uuid,
    names: &[String],
    name_table: &str,
    link_table: &str,
    link_column: &str,
) -> Result<(), RepositoryError> {
    let mut tx = pool.begin().await.map_err(db_err)?;

    sqlx::query(&format!("DELETE FROM {} WHERE novel_id = ?", link_table))
        .bind(novel_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        sqlx::query(&format!(
            "INSERT INTO {} (id, name) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
            name_table
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query(&format!(
            "INSERT INTO {} (novel_id, {}) SELECT ?, id FROM {} WHERE name = ? \
             ON CONFLICT(novel_id, {}) DO NOTHING",
            link_table, link_column, name_table, link_column
        ))
        .bind(novel_id.to_string())
        .bind(name)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    tx.commit().await.map_err(db_err)?;
    Ok(())
}

async fn find_linked_names(
    pool: &DbPool,
    novel_id: Uuid,
    name_table: &str,
    link_table: &str,
    link_column: &str,
) -> Result<Vec<String>, RepositoryError> {
    let rows: Vec<(String,)> = sqlx::query_as(&format!(
        "SELECT t.name FROM {} t INNER JOIN {} l ON l.{} = t.id \
         WHERE l.novel_id = ? ORDER BY t.name COLLATE NOCASE ASC",
        name_table, link_table, link_column
    ))
    .bind(novel_id.to_string())
    .fetch_all(pool)
    .await
    .map_err(db_err)?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{UserRecord, UserRepositoryPort};
    use crate::domain::access::Role;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteUserRepository,
    };
    use chrono::Utc;

    async fn test_pool() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn seed_user(pool: &DbPool, telegram_id: &str) -> Uuid {
        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            telegram_id: telegram_id.to_string(),
            username: None,
            first_name: None,
            last_name: None,
            avatar_url: None,
            bio: None,
            role: Role::Author,
            created_at: now,
            updated_at: now,
        };
        SqliteUserRepository::new(pool.clone())
            .save(&user)
            .await
            .unwrap();
        user.id
    }

    fn sample_novel(owner_id: Uuid, title: &str) -> NovelRecord {
        let now = Utc::now();
        NovelRecord {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            original_title: "原题".to_string(),
            description: None,
            cover_url: None,
            year: Some(2021),
            original_status: NovelStatus::Ongoing,
            translation_status: NovelStatus::Ongoing,
            is_public: false,
            share_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "100").await;
        let repo = SqliteNovelRepository::new(pool);

        let novel = sample_novel(owner, "Lord of the Mysteries");
        repo.save(&novel).await.unwrap();

        let found = repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Lord of the Mysteries");
        assert!(!found.is_public);
        assert!(found.share_token.is_none());
    }

    #[tokio::test]
    async fn test_share_token_lookup_requires_public() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "100").await;
        let repo = SqliteNovelRepository::new(pool);

        let novel = sample_novel(owner, "Shadow Slave");
        repo.save(&novel).await.unwrap();

        repo.set_share(novel.id, true, Some("abc123token"))
            .await
            .unwrap();
        assert!(repo
            .find_by_share_token("abc123token")
            .await
            .unwrap()
            .is_some());

        // 撤销后令牌立即失效
        repo.set_share(novel.id, false, None).await.unwrap();
        assert!(repo
            .find_by_share_token("abc123token")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_rejects_row_breaking_share_invariant() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "100").await;
        let repo = SqliteNovelRepository::new(pool.clone());

        let novel = sample_novel(owner, "Broken Share");
        repo.save(&novel).await.unwrap();

        // 绕过仓储直接破坏两列的耦合：公开但无令牌
        sqlx::query("UPDATE novels SET is_public = 1, share_token = NULL WHERE id = ?")
            .bind(novel.id.to_string())
            .execute(&pool)
            .await
            .unwrap();

        let err = repo.find_by_id(novel.id).await;
        assert!(matches!(err, Err(RepositoryError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_coauthor_roundtrip_and_duplicate() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "100").await;
        let coauthor = seed_user(&pool, "200").await;
        let repo = SqliteNovelRepository::new(pool);

        let novel = sample_novel(owner, "Reverend Insanity");
        repo.save(&novel).await.unwrap();

        repo.add_coauthor(novel.id, coauthor).await.unwrap();
        let err = repo.add_coauthor(novel.id, coauthor).await;
        assert!(matches!(err, Err(RepositoryError::Duplicate(_))));

        assert_eq!(repo.find_coauthors(novel.id).await.unwrap(), vec![coauthor]);

        let coauthored = repo.find_coauthored(coauthor).await.unwrap();
        assert_eq!(coauthored.len(), 1);
        assert_eq!(coauthored[0].id, novel.id);
    }

    #[tokio::test]
    async fn test_set_tags_replaces_previous_set() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "100").await;
        let repo = SqliteNovelRepository::new(pool);

        let novel = sample_novel(owner, "Omniscient Reader");
        repo.save(&novel).await.unwrap();

        repo.set_tags(novel.id, &["сянься".to_string(), "боевик".to_string()])
            .await
            .unwrap();
        repo.set_tags(novel.id, &["фэнтези".to_string()]).await.unwrap();

        assert_eq!(repo.find_tags(novel.id).await.unwrap(), vec!["фэнтези"]);
    }

    #[tokio::test]
    async fn test_filter_by_title_substring() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "100").await;
        let repo = SqliteNovelRepository::new(pool);

        repo.save(&sample_novel(owner, "Martial World")).await.unwrap();
        repo.save(&sample_novel(owner, "Martial Peak")).await.unwrap();
        repo.save(&sample_novel(owner, "Coiling Dragon")).await.unwrap();

        let filter = NovelFilter {
            title: Some("martial".to_string()),
            sort_by: None,
        };
        let found = repo.find_by_owner(owner, &filter).await.unwrap();
        assert_eq!(found.len(), 2);
        // 默认按标题排序
        assert_eq!(found[0].title, "Martial Peak");
    }

    #[tokio::test]
    async fn test_delete_cascades_associations() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "100").await;
        let coauthor = seed_user(&pool, "200").await;
        let repo = SqliteNovelRepository::new(pool);

        let novel = sample_novel(owner, "Release That Witch");
        repo.save(&novel).await.unwrap();
        repo.add_coauthor(novel.id, coauthor).await.unwrap();
        repo.set_tags(novel.id, &["приключения".to_string()]).await.unwrap();

        repo.delete(novel.id).await.unwrap();

        assert!(repo.find_by_id(novel.id).await.unwrap().is_none());
        assert!(repo.find_coauthors(novel.id).await.unwrap().is_empty());
        assert!(repo.find_coauthored(coauthor).await.unwrap().is_empty());
    }
}
