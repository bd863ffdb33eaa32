//! SQLite List Repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;
use uuid::Uuid;

use super::user_repo::parse_timestamp;
use super::DbPool;
use crate::application::ports::{ListRecord, ListRepositoryPort, RepositoryError};
use crate::domain::list::SYSTEM_LISTS;

/// SQLite List Repository
pub struct SqliteListRepository {
    pool: DbPool,
}

impl SqliteListRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ListRow {
    id: String,
    user_id: String,
    name: String,
    is_system: i64,
    position: i64,
    created_at: String,
}

impl TryFrom<ListRow> for ListRecord {
    type Error = RepositoryError;

    fn try_from(row: ListRow) -> Result<Self, Self::Error> {
        Ok(ListRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            name: row.name,
            is_system: row.is_system != 0,
            position: u32::try_from(row.position)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

const LIST_COLUMNS: &str = "id, user_id, name, is_system, position, created_at";

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

#[async_trait]
impl ListRepositoryPort for SqliteListRepository {
    async fn create_system_lists(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let now = Utc::now().to_rfc3339();

        for (position, name) in SYSTEM_LISTS.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO lists (id, user_id, name, is_system, position, created_at)
                VALUES (?, ?, ?, 1, ?, ?)
                ON CONFLICT(user_id, name) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id.to_string())
            .bind(name)
            .bind(position as i64)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn insert(&self, list: &ListRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO lists (id, user_id, name, is_system, position, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(list.id.to_string())
        .bind(list.user_id.to_string())
        .bind(&list.name)
        .bind(list.is_system as i64)
        .bind(list.position as i64)
        .bind(list.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => Err(
                RepositoryError::Duplicate(format!("list '{}'", list.name)),
            ),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<ListRecord>, RepositoryError> {
        let rows: Vec<ListRow> = sqlx::query_as(&format!(
            "SELECT {} FROM lists WHERE user_id = ? ORDER BY position ASC",
            LIST_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ListRecord::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ListRecord>, RepositoryError> {
        let row: Option<ListRow> =
            sqlx::query_as(&format!("SELECT {} FROM lists WHERE id = ?", LIST_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.map(ListRecord::try_from).transpose()
    }

    async fn count_custom(&self, user_id: Uuid) -> Result<usize, RepositoryError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM lists WHERE user_id = ? AND is_system = 0")
                .bind(user_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(row.0 as usize)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM list_novels WHERE list_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let result = sqlx::query("DELETE FROM lists WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("list {}", id)));
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn add_novel(&self, list_id: Uuid, novel_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("INSERT INTO list_novels (list_id, novel_id) VALUES (?, ?)")
            .bind(list_id.to_string())
            .bind(novel_id.to_string())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => Err(
                RepositoryError::Duplicate(format!("novel {} in list {}", novel_id, list_id)),
            ),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn remove_novel(&self, list_id: Uuid, novel_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM list_novels WHERE list_id = ? AND novel_id = ?")
            .bind(list_id.to_string())
            .bind(novel_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "novel {} in list {}",
                novel_id, list_id
            )));
        }

        Ok(())
    }

    async fn find_novel_ids(&self, list_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT novel_id FROM list_novels WHERE list_id = ?")
                .bind(list_id.to_string())
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        NovelRecord, NovelRepositoryPort, UserRecord, UserRepositoryPort,
    };
    use crate::domain::access::Role;
    use crate::domain::novel::NovelStatus;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteNovelRepository, SqliteUserRepository,
    };

    async fn test_pool() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn seed_user(pool: &DbPool) -> Uuid {
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
        user.id
    }

    async fn seed_novel(pool: &DbPool, owner_id: Uuid) -> Uuid {
        let now = Utc::now();
        let novel = NovelRecord {
            id: Uuid::new_v4(),
            owner_id,
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

    #[tokio::test]
    async fn test_create_system_lists_idempotent() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let repo = SqliteListRepository::new(pool);

        repo.create_system_lists(user_id).await.unwrap();
        repo.create_system_lists(user_id).await.unwrap();

        let lists = repo.find_by_user(user_id).await.unwrap();
        assert_eq!(lists.len(), SYSTEM_LISTS.len());
        assert_eq!(lists[0].name, "Все");
        assert!(lists.iter().all(|l| l.is_system));
        assert_eq!(repo.count_custom(user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_custom_list_duplicate_name() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let repo = SqliteListRepository::new(pool);

        let list = ListRecord {
            id: Uuid::new_v4(),
            user_id,
            name: "Китайщина".to_string(),
            is_system: false,
            position: 6,
            created_at: Utc::now(),
        };
        repo.insert(&list).await.unwrap();

        let dup = ListRecord { id: Uuid::new_v4(), ..list };
        let err = repo.insert(&dup).await;
        assert!(matches!(err, Err(RepositoryError::Duplicate(_))));
        assert_eq!(repo.count_custom(user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_membership_roundtrip() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let novel_id = seed_novel(&pool, user_id).await;
        let repo = SqliteListRepository::new(pool);
        repo.create_system_lists(user_id).await.unwrap();

        let list_id = repo.find_by_user(user_id).await.unwrap()[0].id;

        repo.add_novel(list_id, novel_id).await.unwrap();
        let err = repo.add_novel(list_id, novel_id).await;
        assert!(matches!(err, Err(RepositoryError::Duplicate(_))));

        assert_eq!(repo.find_novel_ids(list_id).await.unwrap(), vec![novel_id]);

        repo.remove_novel(list_id, novel_id).await.unwrap();
        assert!(repo.find_novel_ids(list_id).await.unwrap().is_empty());
    }
}
