//! List Queries

use crate::domain::access::Principal;

/// 当前用户的全部书单
#[derive(Debug, Clone)]
pub struct GetLists {
    pub principal: Principal,
}
