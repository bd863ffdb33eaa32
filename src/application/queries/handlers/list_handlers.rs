//! List Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{ListRecord, ListRepositoryPort};
use crate::application::queries::GetLists;

/// 书单及其小说 id
#[derive(Debug, Clone)]
pub struct ListWithNovelsResponse {
    pub list: ListRecord,
    pub novel_ids: Vec<Uuid>,
}

/// GetLists Handler
pub struct GetListsHandler {
    list_repo: Arc<dyn ListRepositoryPort>,
}

impl GetListsHandler {
    pub fn new(list_repo: Arc<dyn ListRepositoryPort>) -> Self {
        Self { list_repo }
    }

    pub async fn handle(
        &self,
        query: GetLists,
    ) -> Result<Vec<ListWithNovelsResponse>, ApplicationError> {
        let user_id = query
            .principal
            .id
            .ok_or_else(|| ApplicationError::unauthorized("login required"))?;

        let lists = self.list_repo.find_by_user(user_id).await?;

        let mut result = Vec::with_capacity(lists.len());
        for list in lists {
            let novel_ids = self.list_repo.find_novel_ids(list.id).await?;
            result.push(ListWithNovelsResponse { list, novel_ids });
        }

        Ok(result)
    }
}
