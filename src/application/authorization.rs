//! 服务边界的统一授权入口
//!
//! 每个命令/查询处理器在读取实体快照后调用一次 `resolve`，
//! 策略逻辑全部集中在 domain::access，处理器只做取数与映射。

use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{NovelRecord, NovelRepositoryPort};
use crate::domain::access::{resolve, AccessDecision, NovelAction, Principal};

/// 读取小说并解析访问权限
///
/// 读取被拒时报告与不存在完全一致（NotFound），避免泄露私有小说的存在性；
/// 其余操作被拒时报告 Forbidden。
pub async fn authorize_novel(
    novel_repo: &dyn NovelRepositoryPort,
    principal: Principal,
    action: NovelAction,
    novel_id: Uuid,
) -> Result<NovelRecord, ApplicationError> {
    let novel = novel_repo
        .find_by_id(novel_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Novel", novel_id))?;

    let coauthors = novel_repo.find_coauthors(novel_id).await?;
    let snapshot = crate::domain::NovelSnapshot {
        id: novel.id,
        owner_id: novel.owner_id,
        is_public: novel.is_public,
        coauthor_ids: coauthors.into_iter().collect(),
    };

    match resolve(principal, action, &snapshot) {
        AccessDecision::Allow => Ok(novel),
        AccessDecision::Deny(_) if action == NovelAction::Read => {
            Err(ApplicationError::not_found("Novel", novel_id))
        }
        AccessDecision::Deny(reason) => Err(ApplicationError::forbidden(reason.as_str())),
    }
}
