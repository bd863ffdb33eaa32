//! List Command Handlers
//!
//! 书单是严格私人的：他人书单的任何操作一律按不存在处理。

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::authorization::authorize_novel;
use crate::application::commands::{
    AddNovelToList, CreateList, DeleteList, RemoveNovelFromList,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ListRecord, ListRepositoryPort, NovelRepositoryPort,
};
use crate::domain::access::{NovelAction, Principal};
use crate::domain::list::{can_add_custom_list, SYSTEM_LISTS};

fn require_user(principal: Principal) -> Result<Uuid, ApplicationError> {
    principal
        .id
        .ok_or_else(|| ApplicationError::unauthorized("login required"))
}

/// 读取属于当前用户的书单，他人的书单一律 NotFound
async fn find_own_list(
    list_repo: &dyn ListRepositoryPort,
    user_id: Uuid,
    list_id: Uuid,
) -> Result<ListRecord, ApplicationError> {
    let list = list_repo
        .find_by_id(list_id)
        .await?
        .filter(|l| l.user_id == user_id)
        .ok_or_else(|| ApplicationError::not_found("List", list_id))?;
    Ok(list)
}

// ============================================================================
// CreateList
// ============================================================================

/// CreateList Handler - 自定义书单，受上限约束
pub struct CreateListHandler {
    list_repo: Arc<dyn ListRepositoryPort>,
}

impl CreateListHandler {
    pub fn new(list_repo: Arc<dyn ListRepositoryPort>) -> Self {
        Self { list_repo }
    }

    pub async fn handle(&self, command: CreateList) -> Result<ListRecord, ApplicationError> {
        let user_id = require_user(command.principal)?;

        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(ApplicationError::validation("list name cannot be empty"));
        }

        let existing_custom = self.list_repo.count_custom(user_id).await?;
        if !can_add_custom_list(existing_custom) {
            return Err(ApplicationError::business_rule(
                "custom list limit reached",
            ));
        }

        let list = ListRecord {
            id: Uuid::new_v4(),
            user_id,
            name,
            is_system: false,
            position: (SYSTEM_LISTS.len() + existing_custom) as u32,
            created_at: Utc::now(),
        };

        self.list_repo.insert(&list).await?;

        tracing::info!(list_id = %list.id, user_id = %user_id, name = %list.name, "List created");

        Ok(list)
    }
}

// ============================================================================
// DeleteList
// ============================================================================

/// DeleteList Handler - 系统书单不可删除
pub struct DeleteListHandler {
    list_repo: Arc<dyn ListRepositoryPort>,
}

impl DeleteListHandler {
    pub fn new(list_repo: Arc<dyn ListRepositoryPort>) -> Self {
        Self { list_repo }
    }

    pub async fn handle(&self, command: DeleteList) -> Result<(), ApplicationError> {
        let user_id = require_user(command.principal)?;
        let list = find_own_list(self.list_repo.as_ref(), user_id, command.list_id).await?;

        if list.is_system {
            return Err(ApplicationError::business_rule(
                "system lists cannot be deleted",
            ));
        }

        self.list_repo.delete(list.id).await?;

        tracing::info!(list_id = %list.id, user_id = %user_id, "List deleted");

        Ok(())
    }
}

// ============================================================================
// List membership
// ============================================================================

/// AddNovelToList Handler
///
/// 小说必须对当前用户可见（Read 解析通过）。
pub struct AddNovelToListHandler {
    list_repo: Arc<dyn ListRepositoryPort>,
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl AddNovelToListHandler {
    pub fn new(
        list_repo: Arc<dyn ListRepositoryPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
    ) -> Self {
        Self {
            list_repo,
            novel_repo,
        }
    }

    pub async fn handle(&self, command: AddNovelToList) -> Result<(), ApplicationError> {
        let user_id = require_user(command.principal)?;
        let list = find_own_list(self.list_repo.as_ref(), user_id, command.list_id).await?;

        authorize_novel(
            self.novel_repo.as_ref(),
            command.principal,
            NovelAction::Read,
            command.novel_id,
        )
        .await?;

        self.list_repo.add_novel(list.id, command.novel_id).await?;

        tracing::info!(
            list_id = %list.id,
            novel_id = %command.novel_id,
            "Novel added to list"
        );

        Ok(())
    }
}

/// RemoveNovelFromList Handler
pub struct RemoveNovelFromListHandler {
    list_repo: Arc<dyn ListRepositoryPort>,
}

impl RemoveNovelFromListHandler {
    pub fn new(list_repo: Arc<dyn ListRepositoryPort>) -> Self {
        Self { list_repo }
    }

    pub async fn handle(&self, command: RemoveNovelFromList) -> Result<(), ApplicationError> {
        let user_id = require_user(command.principal)?;
        let list = find_own_list(self.list_repo.as_ref(), user_id, command.list_id).await?;

        self.list_repo
            .remove_novel(list.id, command.novel_id)
            .await?;

        tracing::info!(
            list_id = %list.id,
            novel_id = %command.novel_id,
            "Novel removed from list"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::application::ports::{UserRecord, UserRepositoryPort};
    use crate::domain::access::Role;
    use crate::domain::list::MAX_CUSTOM_LISTS;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteListRepository, SqliteUserRepository,
    };

    struct Harness {
        user_repo: Arc<dyn UserRepositoryPort>,
        list_repo: Arc<dyn ListRepositoryPort>,
    }

    async fn harness() -> Harness {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Harness {
            user_repo: Arc::new(SqliteUserRepository::new(pool.clone())),
            list_repo: Arc::new(SqliteListRepository::new(pool)),
        }
    }

    async fn signup(h: &Harness, telegram_id: &str) -> Principal {
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
        h.user_repo.save(&user).await.unwrap();
        h.list_repo.create_system_lists(user.id).await.unwrap();
        Principal::authenticated(user.id, Role::Author)
    }

    /// 自定义书单到达上限后，再创建报 BusinessRuleViolation
    #[tokio::test]
    async fn test_custom_list_cap_enforced_by_handler() {
        let h = harness().await;
        let principal = signup(&h, "100").await;
        let handler = CreateListHandler::new(h.list_repo.clone());

        for i in 0..MAX_CUSTOM_LISTS {
            handler
                .handle(CreateList {
                    principal,
                    name: format!("Полка {}", i + 1),
                })
                .await
                .unwrap();
        }

        let err = handler
            .handle(CreateList {
                principal,
                name: "Лишняя".to_string(),
            })
            .await;
        assert!(matches!(err, Err(ApplicationError::BusinessRuleViolation(_))));

        let lists = h.list_repo.find_by_user(principal.id.unwrap()).await.unwrap();
        assert_eq!(lists.len(), SYSTEM_LISTS.len() + MAX_CUSTOM_LISTS);
    }

    /// 系统书单不可删除，自定义书单可以
    #[tokio::test]
    async fn test_system_list_delete_rejected() {
        let h = harness().await;
        let principal = signup(&h, "100").await;
        let user_id = principal.id.unwrap();

        let system_list = h
            .list_repo
            .find_by_user(user_id)
            .await
            .unwrap()
            .into_iter()
            .find(|l| l.is_system)
            .unwrap();

        let handler = DeleteListHandler::new(h.list_repo.clone());
        let err = handler
            .handle(DeleteList {
                principal,
                list_id: system_list.id,
            })
            .await;
        assert!(matches!(err, Err(ApplicationError::BusinessRuleViolation(_))));
        assert!(h.list_repo.find_by_id(system_list.id).await.unwrap().is_some());

        let custom = CreateListHandler::new(h.list_repo.clone())
            .handle(CreateList {
                principal,
                name: "Перечитать".to_string(),
            })
            .await
            .unwrap();
        handler
            .handle(DeleteList {
                principal,
                list_id: custom.id,
            })
            .await
            .unwrap();
        assert!(h.list_repo.find_by_id(custom.id).await.unwrap().is_none());
    }

    /// 他人的书单按不存在处理
    #[tokio::test]
    async fn test_foreign_list_reported_as_not_found() {
        let h = harness().await;
        let alice = signup(&h, "100").await;
        let bob = signup(&h, "200").await;

        let alices_list = h
            .list_repo
            .find_by_user(alice.id.unwrap())
            .await
            .unwrap()
            .into_iter()
            .next()
            .unwrap();

        let err = DeleteListHandler::new(h.list_repo.clone())
            .handle(DeleteList {
                principal: bob,
                list_id: alices_list.id,
            })
            .await;
        assert!(matches!(err, Err(ApplicationError::NotFound { .. })));
    }
}
