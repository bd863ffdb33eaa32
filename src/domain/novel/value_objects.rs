//! Novel Context - Value Objects

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 小说标题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title(String);

impl Title {
    pub fn new(title: impl Into<String>) -> Result<Self, &'static str> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err("标题不能为空");
        }
        if trimmed.chars().count() > 300 {
            return Err("标题长度不能超过300字符");
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 分享令牌 - 授予匿名只读访问的不透明字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareToken(String);

impl ShareToken {
    const LEN: usize = 32;

    /// 生成新令牌
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn from_string(token: impl Into<String>) -> Result<Self, &'static str> {
        let token = token.into();
        if token.is_empty() {
            return Err("分享令牌不能为空");
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 分享状态
///
/// 不变量：share_token 非空当且仅当小说公开。
/// 用枚举而不是两个独立字段表达，使非法状态不可构造。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareState {
    Private,
    Shared(ShareToken),
}

impl ShareState {
    /// 从持久化的两列还原，列组合非法时报错
    pub fn from_columns(is_public: bool, share_token: Option<String>) -> Result<Self, &'static str> {
        match (is_public, share_token) {
            (false, None) => Ok(ShareState::Private),
            (true, Some(token)) => Ok(ShareState::Shared(ShareToken::from_string(token)?)),
            (true, None) => Err("公开小说缺少分享令牌"),
            (false, Some(_)) => Err("私有小说不应持有分享令牌"),
        }
    }

    /// 拆回持久化的两列
    pub fn into_columns(self) -> (bool, Option<String>) {
        match self {
            ShareState::Private => (false, None),
            ShareState::Shared(token) => (true, Some(token.0)),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, ShareState::Shared(_))
    }
}

/// 连载状态（原作与翻译共用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NovelStatus {
    /// 连载中
    Ongoing,
    /// 已完结
    Completed,
    /// 停更
    Frozen,
}

impl NovelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NovelStatus::Ongoing => "ONGOING",
            NovelStatus::Completed => "COMPLETED",
            NovelStatus::Frozen => "FROZEN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ONGOING" => Some(NovelStatus::Ongoing),
            "COMPLETED" => Some(NovelStatus::Completed),
            "FROZEN" => Some(NovelStatus::Frozen),
            _ => None,
        }
    }
}

impl Default for NovelStatus {
    fn default() -> Self {
        NovelStatus::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_rejects_empty_and_whitespace() {
        assert!(Title::new("").is_err());
        assert!(Title::new("   ").is_err());
    }

    #[test]
    fn test_title_trims() {
        let title = Title::new("  咸鱼翻身  ").unwrap();
        assert_eq!(title.as_str(), "咸鱼翻身");
    }

    #[test]
    fn test_share_token_generated_unique() {
        let a = ShareToken::generate();
        let b = ShareToken::generate();
        assert_eq!(a.as_str().len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_share_state_round_trip() {
        let shared = ShareState::Shared(ShareToken::generate());
        let (is_public, token) = shared.clone().into_columns();
        assert!(is_public);
        assert_eq!(ShareState::from_columns(is_public, token).unwrap(), shared);

        let (is_public, token) = ShareState::Private.into_columns();
        assert!(!is_public);
        assert!(token.is_none());
    }

    #[test]
    fn test_share_state_rejects_illegal_columns() {
        assert!(ShareState::from_columns(true, None).is_err());
        assert!(ShareState::from_columns(false, Some("x".into())).is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [NovelStatus::Ongoing, NovelStatus::Completed, NovelStatus::Frozen] {
            assert_eq!(NovelStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(NovelStatus::from_str("PAUSED"), None);
    }
}
