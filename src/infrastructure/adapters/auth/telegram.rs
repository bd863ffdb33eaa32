//! Telegram InitData Verifier - Telegram WebApp 登录载荷校验
//!
//! 实现 IdentityVerifierPort trait
//!
//! 校验流程（Telegram 官方规范）:
//! 1. initData 是 querystring，取出 hash 字段
//! 2. 其余字段按 key 排序拼成 "key=value\n..." 的 data-check-string
//! 3. secret = HMAC_SHA256(key="WebAppData", msg=bot_token)
//! 4. hash == hex(HMAC_SHA256(key=secret, msg=data-check-string))
//! 5. auth_date 距当前不超过 max_age

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::application::ports::{IdentityError, IdentityVerifierPort, VerifiedTelegramUser};

type HmacSha256 = Hmac<Sha256>;

/// 登录载荷的最大有效期（秒）
const DEFAULT_MAX_AGE_SECS: i64 = 86400;

/// initData 内嵌的 user JSON
#[derive(Debug, Deserialize)]
struct InitDataUser {
    id: i64,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

/// Telegram initData 校验器
pub struct TelegramInitDataVerifier {
    bot_token: String,
    max_age_secs: i64,
}

impl TelegramInitDataVerifier {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }

    #[cfg(test)]
    fn with_max_age(mut self, secs: i64) -> Self {
        self.max_age_secs = secs;
        self
    }

    fn expected_hash(&self, data_check_string: &str) -> String {
        // secret key 以固定字符串 "WebAppData" 为 HMAC key 对 bot_token 取摘要
        let mut secret_mac = HmacSha256::new_from_slice(b"WebAppData")
            .expect("HMAC accepts any key length");
        secret_mac.update(self.bot_token.as_bytes());
        let secret = secret_mac.finalize().into_bytes();

        let mut mac =
            HmacSha256::new_from_slice(&secret).expect("HMAC accepts any key length");
        mac.update(data_check_string.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl IdentityVerifierPort for TelegramInitDataVerifier {
    fn verify(&self, init_data: &str) -> Result<VerifiedTelegramUser, IdentityError> {
        if self.bot_token.is_empty() {
            return Err(IdentityError::NotConfigured("bot token is empty".into()));
        }

        let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(init_data.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let hash_index = pairs
            .iter()
            .position(|(k, _)| k == "hash")
            .ok_or_else(|| IdentityError::InvalidPayload("missing hash field".into()))?;
        let (_, received_hash) = pairs.remove(hash_index);

        pairs.sort_by(|(a, _), (b, _)| a.cmp(b));
        let data_check_string = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n");

        let expected = self.expected_hash(&data_check_string);
        // 十六进制串均为小写 ASCII，直接比较
        if expected != received_hash.to_lowercase() {
            return Err(IdentityError::BadSignature);
        }

        let auth_date: i64 = pairs
            .iter()
            .find(|(k, _)| k == "auth_date")
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| IdentityError::InvalidPayload("missing auth_date field".into()))?
            .parse()
            .map_err(|_| IdentityError::InvalidPayload("auth_date is not a number".into()))?;

        let age = chrono::Utc::now().timestamp() - auth_date;
        if age > self.max_age_secs {
            return Err(IdentityError::Expired);
        }

        let user_json = pairs
            .iter()
            .find(|(k, _)| k == "user")
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| IdentityError::InvalidPayload("missing user field".into()))?;

        let user: InitDataUser = serde_json::from_str(user_json)
            .map_err(|e| IdentityError::InvalidPayload(format!("bad user json: {}", e)))?;

        Ok(VerifiedTelegramUser {
            telegram_id: user.id.to_string(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            photo_url: user.photo_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_TOKEN: &str = "123456:TEST-TOKEN";

    /// 用与校验器相同的规范为测试载荷签名
    fn signed_init_data(fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<(&str, &str)> = fields.to_vec();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));
        let data_check_string = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n");

        let verifier = TelegramInitDataVerifier::new(BOT_TOKEN);
        let hash = verifier.expected_hash(&data_check_string);

        let mut encoded: Vec<String> = fields
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    k,
                    url::form_urlencoded::byte_serialize(v.as_bytes()).collect::<String>()
                )
            })
            .collect();
        encoded.push(format!("hash={}", hash));
        encoded.join("&")
    }

    fn fresh_fields(auth_date: i64) -> Vec<(String, String)> {
        vec![
            (
                "user".to_string(),
                r#"{"id":42,"username":"translator","first_name":"Ли"}"#.to_string(),
            ),
            ("auth_date".to_string(), auth_date.to_string()),
            ("query_id".to_string(), "AAEtest".to_string()),
        ]
    }

    #[test]
    fn test_valid_init_data() {
        let fields = fresh_fields(chrono::Utc::now().timestamp());
        let borrowed: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let init_data = signed_init_data(&borrowed);

        let verifier = TelegramInitDataVerifier::new(BOT_TOKEN);
        let user = verifier.verify(&init_data).unwrap();
        assert_eq!(user.telegram_id, "42");
        assert_eq!(user.username.as_deref(), Some("translator"));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let fields = fresh_fields(chrono::Utc::now().timestamp());
        let borrowed: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let init_data = signed_init_data(&borrowed);

        let tampered = init_data.replace("AAEtest", "AAEevil");
        let verifier = TelegramInitDataVerifier::new(BOT_TOKEN);
        assert!(matches!(
            verifier.verify(&tampered),
            Err(IdentityError::BadSignature)
        ));
    }

    #[test]
    fn test_wrong_bot_token_rejected() {
        let fields = fresh_fields(chrono::Utc::now().timestamp());
        let borrowed: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let init_data = signed_init_data(&borrowed);

        let verifier = TelegramInitDataVerifier::new("999:OTHER-TOKEN");
        assert!(matches!(
            verifier.verify(&init_data),
            Err(IdentityError::BadSignature)
        ));
    }

    #[test]
    fn test_stale_auth_date_rejected() {
        let fields = fresh_fields(chrono::Utc::now().timestamp() - 7200);
        let borrowed: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let init_data = signed_init_data(&borrowed);

        let verifier = TelegramInitDataVerifier::new(BOT_TOKEN).with_max_age(3600);
        assert!(matches!(
            verifier.verify(&init_data),
            Err(IdentityError::Expired)
        ));
    }

    #[test]
    fn test_missing_hash_rejected() {
        let verifier = TelegramInitDataVerifier::new(BOT_TOKEN);
        assert!(matches!(
            verifier.verify("auth_date=1&user=%7B%22id%22%3A42%7D"),
            Err(IdentityError::InvalidPayload(_))
        ));
    }
}
