//! Ordering Context - 序号计算
//!
//! 纯函数：输入现状快照，输出序号分配方案。
//! 实际落库（事务、唯一约束冲突重试）在持久化层完成。

use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// 重排错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReorderError {
    /// 提交的章节 id 集合与小说实际章节不一致
    #[error("重排集合无效: {0}")]
    InvalidReorderSet(String),
}

/// 单章的序号分配
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAssignment {
    pub chapter_id: Uuid,
    pub order: u32,
}

/// 计算尾部插入的序号
///
/// `existing_max` 必须来自插入前的实时读取，不可缓存，
/// 否则并发插入会产生序号冲突（由 (novel_id, order) 唯一约束兜底）。
pub fn next_order(existing_max: Option<u32>) -> u32 {
    match existing_max {
        Some(max) => max + 1,
        None => 1,
    }
}

/// 校验并规划显式全量重排
///
/// 前置条件：`submitted` 必须恰好是 `current` 的一个排列。
/// 缺章、多章、重复、外来 id 一律拒绝，绝不部分应用。
/// 通过校验后按提交顺序分配 order = 下标 + 1。
pub fn plan_explicit_order(
    current: &[Uuid],
    submitted: &[Uuid],
) -> Result<Vec<OrderAssignment>, ReorderError> {
    if submitted.len() != current.len() {
        return Err(ReorderError::InvalidReorderSet(format!(
            "expected {} chapter ids, got {}",
            current.len(),
            submitted.len()
        )));
    }

    let current_set: HashSet<Uuid> = current.iter().copied().collect();
    let mut seen: HashSet<Uuid> = HashSet::with_capacity(submitted.len());

    for id in submitted {
        if !current_set.contains(id) {
            return Err(ReorderError::InvalidReorderSet(format!(
                "chapter {} does not belong to this novel",
                id
            )));
        }
        if !seen.insert(*id) {
            return Err(ReorderError::InvalidReorderSet(format!(
                "duplicate chapter id {}",
                id
            )));
        }
    }

    Ok(submitted
        .iter()
        .enumerate()
        .map(|(index, id)| OrderAssignment {
            chapter_id: *id,
            order: index as u32 + 1,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_next_order_empty_novel() {
        assert_eq!(next_order(None), 1);
    }

    #[test]
    fn test_next_order_appends_at_tail() {
        assert_eq!(next_order(Some(1)), 2);
        assert_eq!(next_order(Some(41)), 42);
    }

    #[test]
    fn test_explicit_order_assigns_index_plus_one() {
        let chapters = ids(3);
        let reversed: Vec<Uuid> = chapters.iter().rev().copied().collect();

        let plan = plan_explicit_order(&chapters, &reversed).unwrap();

        assert_eq!(plan.len(), 3);
        for (index, assignment) in plan.iter().enumerate() {
            assert_eq!(assignment.chapter_id, reversed[index]);
            assert_eq!(assignment.order, index as u32 + 1);
        }
    }

    #[test]
    fn test_explicit_order_identity_permutation() {
        let chapters = ids(4);
        let plan = plan_explicit_order(&chapters, &chapters).unwrap();
        let orders: Vec<u32> = plan.iter().map(|a| a.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_explicit_order_rejects_missing_id() {
        let chapters = ids(3);
        let short = &chapters[..2];

        let err = plan_explicit_order(&chapters, short).unwrap_err();
        assert!(matches!(err, ReorderError::InvalidReorderSet(_)));
    }

    #[test]
    fn test_explicit_order_rejects_extra_id() {
        let chapters = ids(2);
        let mut long = chapters.clone();
        long.push(Uuid::new_v4());

        let err = plan_explicit_order(&chapters, &long).unwrap_err();
        assert!(matches!(err, ReorderError::InvalidReorderSet(_)));
    }

    #[test]
    fn test_explicit_order_rejects_foreign_id() {
        let chapters = ids(2);
        let foreign = vec![chapters[0], Uuid::new_v4()];

        let err = plan_explicit_order(&chapters, &foreign).unwrap_err();
        assert!(matches!(err, ReorderError::InvalidReorderSet(_)));
    }

    #[test]
    fn test_explicit_order_rejects_duplicate_id() {
        let chapters = ids(2);
        let duplicated = vec![chapters[0], chapters[0]];

        let err = plan_explicit_order(&chapters, &duplicated).unwrap_err();
        assert!(matches!(err, ReorderError::InvalidReorderSet(_)));
    }

    #[test]
    fn test_explicit_order_empty_novel() {
        let plan = plan_explicit_order(&[], &[]).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_insert_then_remove_restores_sequence() {
        // 对应性质：尾插后立即删除，序列回到插入前
        let before: Vec<u32> = vec![1, 2, 3];
        let new_order = next_order(before.iter().copied().max());
        assert_eq!(new_order, 4);

        // 删除 order=4 的章节，> 4 的不存在，无需压缩
        let after: Vec<u32> = before.clone();
        assert_eq!(after, before);
    }

    #[test]
    fn test_compaction_shifts_higher_orders() {
        // 删除 order=k 后，k+1..N 依次减一，1..k-1 不变。
        // 压缩本身由持久化层的一条 UPDATE 完成，这里验证目标序列。
        let n = 5u32;
        let k = 2u32;
        let remaining: Vec<u32> = (1..=n)
            .filter(|&o| o != k)
            .map(|o| if o > k { o - 1 } else { o })
            .collect();
        assert_eq!(remaining, vec![1, 2, 3, 4]);
    }
}
