//! List Context - 书单限界上下文
//!
//! 规则:
//! - 每个用户注册时创建六个固定系统书单，不可删除
//! - 之后最多可再建 3 个自定义书单

/// 自定义书单上限
pub const MAX_CUSTOM_LISTS: usize = 3;

/// 注册时创建的系统书单，顺序即展示顺序
pub const SYSTEM_LISTS: [&str; 6] = [
    "Все",
    "Читаю",
    "В планах",
    "Брошено",
    "Прочитано",
    "Любимое",
];

/// 是否还允许创建自定义书单
pub fn can_add_custom_list(existing_custom: usize) -> bool {
    existing_custom < MAX_CUSTOM_LISTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_system_lists() {
        assert_eq!(SYSTEM_LISTS.len(), 6);
    }

    #[test]
    fn test_custom_list_cap() {
        assert!(can_add_custom_list(0));
        assert!(can_add_custom_list(2));
        assert!(!can_add_custom_list(3));
        assert!(!can_add_custom_list(4));
    }
}
