//! Auth Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::TelegramLogin;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AuthClaims, AuthTokenPort, IdentityVerifierPort, ListRepositoryPort, UserRecord,
    UserRepositoryPort,
};
use crate::domain::access::Role;

/// 登录响应
#[derive(Debug, Clone)]
pub struct TelegramLoginResponse {
    pub user: UserRecord,
    pub token: String,
    /// 本次登录是否创建了新账号
    pub created: bool,
}

/// TelegramLogin Handler
///
/// 校验签名载荷，按 telegram_id 查找或创建用户，
/// 新用户同时创建全部系统书单，最后签发会话令牌。
pub struct TelegramLoginHandler {
    verifier: Arc<dyn IdentityVerifierPort>,
    tokens: Arc<dyn AuthTokenPort>,
    user_repo: Arc<dyn UserRepositoryPort>,
    list_repo: Arc<dyn ListRepositoryPort>,
}

impl TelegramLoginHandler {
    pub fn new(
        verifier: Arc<dyn IdentityVerifierPort>,
        tokens: Arc<dyn AuthTokenPort>,
        user_repo: Arc<dyn UserRepositoryPort>,
        list_repo: Arc<dyn ListRepositoryPort>,
    ) -> Self {
        Self {
            verifier,
            tokens,
            user_repo,
            list_repo,
        }
    }

    pub async fn handle(
        &self,
        command: TelegramLogin,
    ) -> Result<TelegramLoginResponse, ApplicationError> {
        let identity = self.verifier.verify(&command.init_data)?;

        let existing = self
            .user_repo
            .find_by_telegram_id(&identity.telegram_id)
            .await?;

        let (user, created) = match existing {
            Some(user) => (user, false),
            None => {
                let now = Utc::now();
                let user = UserRecord {
                    id: Uuid::new_v4(),
                    telegram_id: identity.telegram_id.clone(),
                    username: identity.username.clone(),
                    first_name: identity.first_name.clone(),
                    last_name: identity.last_name.clone(),
                    avatar_url: identity.photo_url.clone(),
                    bio: None,
                    role: Role::Author,
                    created_at: now,
                    updated_at: now,
                };

                self.user_repo.save(&user).await?;
                self.list_repo.create_system_lists(user.id).await?;

                tracing::info!(
                    user_id = %user.id,
                    telegram_id = %user.telegram_id,
                    "User registered"
                );

                (user, true)
            }
        };

        let token = self.tokens.issue(&AuthClaims {
            user_id: user.id,
            telegram_id: user.telegram_id.clone(),
            role: user.role,
        })?;

        tracing::info!(user_id = %user.id, created = created, "User logged in");

        Ok(TelegramLoginResponse {
            user,
            token,
            created,
        })
    }
}
