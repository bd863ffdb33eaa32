//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 标题等值对象校验
//! - 分享状态（is_public 与 share_token 同设同清的不变量）
//! - 连载状态枚举

mod value_objects;

pub use value_objects::{NovelStatus, ShareState, ShareToken, Title};
