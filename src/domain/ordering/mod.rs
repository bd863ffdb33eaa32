//! Ordering Context - 章节排序限界上下文
//!
//! 维护单本小说内稠密无缝的章节序号:
//! 任意时刻某小说全部章节的 order 集合恰为 {1..N}，无重复无空洞。
//! 插入/删除/重排后该不变量必须成立。

mod sequencer;

pub use sequencer::{next_order, plan_explicit_order, OrderAssignment, ReorderError};
