//! SQLite Chapter Repository
//!
//! (novel_id, chapter_order) 唯一约束由 schema 保证。
//! 批量改序时先写入负数序号再翻转符号，避免中间状态触发约束。

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use super::user_repo::parse_timestamp;
use super::DbPool;
use crate::application::ports::{ChapterRecord, ChapterRepositoryPort, RepositoryError};
use crate::domain::ordering::OrderAssignment;

/// SQLite Chapter Repository
pub struct SqliteChapterRepository {
    pool: DbPool,
}

impl SqliteChapterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    novel_id: String,
    title: String,
    chapter_order: i64,
    storage_key: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(ChapterRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            novel_id: Uuid::parse_str(&row.novel_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            title: row.title,
            order: u32::try_from(row.chapter_order)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            storage_key: row.storage_key,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

const CHAPTER_COLUMNS: &str =
    "id, novel_id, title, chapter_order, storage_key, created_at, updated_at";

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

fn map_insert_err(e: sqlx::Error, novel_id: Uuid) -> RepositoryError {
    if e.to_string().contains("UNIQUE constraint failed") {
        RepositoryError::Conflict(format!("chapter order taken on novel {}", novel_id))
    } else {
        db_err(e)
    }
}

#[async_trait]
impl ChapterRepositoryPort for SqliteChapterRepository {
    async fn insert(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, novel_id, title, chapter_order, storage_key, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(chapter.id.to_string())
        .bind(chapter.novel_id.to_string())
        .bind(&chapter.title)
        .bind(chapter.order as i64)
        .bind(&chapter.storage_key)
        .bind(chapter.created_at.to_rfc3339())
        .bind(chapter.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, chapter.novel_id))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
        let row: Option<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters WHERE id = ?",
            CHAPTER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(ChapterRecord::try_from).transpose()
    }

    async fn find_by_novel(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters WHERE novel_id = ? ORDER BY chapter_order ASC",
            CHAPTER_COLUMNS
        ))
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }

    async fn max_order(&self, novel_id: Uuid) -> Result<Option<u32>, RepositoryError> {
        let row: (Option<i64>,) =
            sqlx::query_as("SELECT MAX(chapter_order) FROM chapters WHERE novel_id = ?")
                .bind(novel_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;

        row.0
            .map(|max| {
                u32::try_from(max).map_err(|e| RepositoryError::SerializationError(e.to_string()))
            })
            .transpose()
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chapters SET title = ?, updated_at = ? WHERE id = ?")
            .bind(title)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("chapter {}", id)));
        }

        Ok(())
    }

    async fn touch(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chapters SET updated_at = ? WHERE id = ?")
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("chapter {}", id)));
        }

        Ok(())
    }

    async fn remove_and_compact(
        &self,
        novel_id: Uuid,
        chapter_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let removed: Option<(i64,)> = sqlx::query_as(
            "SELECT chapter_order FROM chapters WHERE id = ? AND novel_id = ?",
        )
        .bind(chapter_id.to_string())
        .bind(novel_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let Some((removed_order,)) = removed else {
            return Err(RepositoryError::NotFound(format!("chapter {}", chapter_id)));
        };

        sqlx::query("DELETE FROM chapters WHERE id = ?")
            .bind(chapter_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        // 先置为负序号再翻转，避免逐行 -1 时撞上仍在位的旧行
        sqlx::query(
            "UPDATE chapters SET chapter_order = -(chapter_order - 1) \
             WHERE novel_id = ? AND chapter_order > ?",
        )
        .bind(novel_id.to_string())
        .bind(removed_order)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_insert_err(e, novel_id))?;

        sqlx::query(
            "UPDATE chapters SET chapter_order = -chapter_order \
             WHERE novel_id = ? AND chapter_order < 0",
        )
        .bind(novel_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_insert_err(e, novel_id))?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn apply_order(
        &self,
        novel_id: Uuid,
        assignments: &[OrderAssignment],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for assignment in assignments {
            let result = sqlx::query(
                "UPDATE chapters SET chapter_order = ? WHERE id = ? AND novel_id = ?",
            )
            .bind(-(assignment.order as i64))
            .bind(assignment.chapter_id.to_string())
            .bind(novel_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_insert_err(e, novel_id))?;

            // 规划与执行之间章节集合变了，按冲突上报让调用方重读重试
            if result.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(format!(
                    "chapter {} no longer belongs to novel {}",
                    assignment.chapter_id, novel_id
                )));
            }
        }

        sqlx::query(
            "UPDATE chapters SET chapter_order = -chapter_order \
             WHERE novel_id = ? AND chapter_order < 0",
        )
        .bind(novel_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_insert_err(e, novel_id))?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{NovelRecord, NovelRepositoryPort, UserRecord, UserRepositoryPort};
    use crate::domain::access::Role;
    use crate::domain::novel::NovelStatus;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteNovelRepository, SqliteUserRepository,
    };
    use chrono::Utc;

    async fn test_pool() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn seed_novel(pool: &DbPool) -> Uuid {
        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            telegram_id: "100".to_string(),
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

        let novel = NovelRecord {
            id: Uuid::new_v4(),
            owner_id: user.id,
            title: "Sample".to_string(),
            original_title: "样本".to_string(),
            description: None,
            cover_url: None,
            year: None,
            original_status: NovelStatus::Ongoing,
            translation_status: NovelStatus::Ongoing,
            is_public: false,
            share_token: None,
            created_at: now,
            updated_at: now,
        };
        SqliteNovelRepository::new(pool.clone())
            .save(&novel)
            .await
            .unwrap();
        novel.id
    }

    fn chapter(novel_id: Uuid, title: &str, order: u32) -> ChapterRecord {
        let now = Utc::now();
        let id = Uuid::new_v4();
        ChapterRecord {
            id,
            novel_id,
            title: title.to_string(),
            order,
            storage_key: format!("chapters/{}.txt", id),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_duplicate_order_reports_conflict() {
        let pool = test_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        repo.insert(&chapter(novel_id, "One", 1)).await.unwrap();
        let err = repo.insert(&chapter(novel_id, "Also One", 1)).await;
        assert!(matches!(err, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_max_order_empty_novel() {
        let pool = test_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        assert_eq!(repo.max_order(novel_id).await.unwrap(), None);

        repo.insert(&chapter(novel_id, "One", 1)).await.unwrap();
        repo.insert(&chapter(novel_id, "Two", 2)).await.unwrap();
        assert_eq!(repo.max_order(novel_id).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_remove_and_compact_closes_gap() {
        let pool = test_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        let c1 = chapter(novel_id, "One", 1);
        let c2 = chapter(novel_id, "Two", 2);
        let c3 = chapter(novel_id, "Three", 3);
        repo.insert(&c1).await.unwrap();
        repo.insert(&c2).await.unwrap();
        repo.insert(&c3).await.unwrap();

        repo.remove_and_compact(novel_id, c2.id).await.unwrap();

        let remaining = repo.find_by_novel(novel_id).await.unwrap();
        let orders: Vec<(String, u32)> = remaining
            .iter()
            .map(|c| (c.title.clone(), c.order))
            .collect();
        assert_eq!(
            orders,
            vec![("One".to_string(), 1), ("Three".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_remove_missing_chapter() {
        let pool = test_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        let err = repo.remove_and_compact(novel_id, Uuid::new_v4()).await;
        assert!(matches!(err, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_apply_order_full_permutation() {
        let pool = test_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        let c1 = chapter(novel_id, "One", 1);
        let c2 = chapter(novel_id, "Two", 2);
        let c3 = chapter(novel_id, "Three", 3);
        repo.insert(&c1).await.unwrap();
        repo.insert(&c2).await.unwrap();
        repo.insert(&c3).await.unwrap();

        // 倒序重排，所有行互换序号
        repo.apply_order(
            novel_id,
            &[
                OrderAssignment { chapter_id: c3.id, order: 1 },
                OrderAssignment { chapter_id: c2.id, order: 2 },
                OrderAssignment { chapter_id: c1.id, order: 3 },
            ],
        )
        .await
        .unwrap();

        let reordered = repo.find_by_novel(novel_id).await.unwrap();
        let titles: Vec<&str> = reordered.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Three", "Two", "One"]);
    }

    #[tokio::test]
    async fn test_apply_order_unknown_chapter_conflicts() {
        let pool = test_pool().await;
        let novel_id = seed_novel(&pool).await;
        let repo = SqliteChapterRepository::new(pool);

        let c1 = chapter(novel_id, "One", 1);
        repo.insert(&c1).await.unwrap();

        let err = repo
            .apply_order(
                novel_id,
                &[OrderAssignment { chapter_id: Uuid::new_v4(), order: 1 }],
            )
            .await;
        assert!(matches!(err, Err(RepositoryError::Conflict(_))));

        // 失败的事务不留痕
        let chapters = repo.find_by_novel(novel_id).await.unwrap();
        assert_eq!(chapters[0].order, 1);
    }
}
