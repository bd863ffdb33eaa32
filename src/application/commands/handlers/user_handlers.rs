//! User Command Handlers

use std::sync::Arc;

use crate::application::commands::UpdateUserRole;
use crate::application::error::ApplicationError;
use crate::application::ports::{UserRecord, UserRepositoryPort};

/// UpdateUserRole Handler - 仅管理员
pub struct UpdateUserRoleHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl UpdateUserRoleHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, command: UpdateUserRole) -> Result<UserRecord, ApplicationError> {
        if !command.principal.is_admin() {
            return Err(ApplicationError::forbidden(
                "only admins may change user roles",
            ));
        }

        let mut user = self
            .user_repo
            .find_by_id(command.user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("User", command.user_id))?;

        self.user_repo.update_role(user.id, command.role).await?;
        user.role = command.role;

        tracing::info!(
            user_id = %user.id,
            role = user.role.as_str(),
            "User role updated"
        );

        Ok(user)
    }
}
