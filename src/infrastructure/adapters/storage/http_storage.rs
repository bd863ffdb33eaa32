//! HTTP Chapter Storage - 远端对象存储网关实现
//!
//! 实现 ChapterStoragePort trait，通过 HTTP 调用对象存储网关
//!
//! 网关 API:
//! PUT    {base_url}/{key}  Request: text/plain 正文
//! GET    {base_url}/{key}  Response: text/plain 正文
//! DELETE {base_url}/{key}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::application::ports::{ChapterStorageError, ChapterStoragePort};

/// HTTP 存储网关配置
#[derive(Debug, Clone)]
pub struct HttpChapterStorageConfig {
    /// 网关基础 URL
    pub base_url: String,
    /// Bearer 访问密钥
    pub secret: Option<String>,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpChapterStorageConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            secret: None,
            timeout_secs: 30,
        }
    }
}

impl HttpChapterStorageConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }
}

/// HTTP 章节存储客户端
pub struct HttpChapterStorage {
    client: Client,
    config: HttpChapterStorageConfig,
}

impl HttpChapterStorage {
    pub fn new(config: HttpChapterStorageConfig) -> Result<Self, ChapterStorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChapterStorageError::GatewayError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), key)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.secret {
            Some(secret) => request.bearer_auth(secret),
            None => request,
        }
    }
}

fn network_err(e: reqwest::Error) -> ChapterStorageError {
    if e.is_connect() {
        ChapterStorageError::GatewayError(format!("Cannot connect to storage gateway: {}", e))
    } else {
        ChapterStorageError::GatewayError(e.to_string())
    }
}

#[async_trait]
impl ChapterStoragePort for HttpChapterStorage {
    async fn put_text(&self, key: &str, content: &str) -> Result<(), ChapterStorageError> {
        let response = self
            .with_auth(self.client.put(self.object_url(key)))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(content.to_string())
            .send()
            .await
            .map_err(network_err)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChapterStorageError::GatewayError(format!(
                "PUT {} failed: HTTP {}: {}",
                key, status, error_text
            )));
        }

        tracing::debug!("Uploaded chapter body: key={}, size={} bytes", key, content.len());

        Ok(())
    }

    async fn get_text(&self, key: &str) -> Result<String, ChapterStorageError> {
        let response = self
            .with_auth(self.client.get(self.object_url(key)))
            .send()
            .await
            .map_err(network_err)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ChapterStorageError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChapterStorageError::GatewayError(format!(
                "GET {} failed: HTTP {}: {}",
                key, status, error_text
            )));
        }

        response.text().await.map_err(network_err)
    }

    async fn delete(&self, key: &str) -> Result<(), ChapterStorageError> {
        let response = self
            .with_auth(self.client.delete(self.object_url(key)))
            .send()
            .await
            .map_err(network_err)?;

        let status = response.status();
        // 不存在视为删除成功
        if status == StatusCode::NOT_FOUND || status.is_success() {
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(ChapterStorageError::GatewayError(format!(
            "DELETE {} failed: HTTP {}: {}",
            key, status, error_text
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_join() {
        let storage = HttpChapterStorage::new(HttpChapterStorageConfig::new(
            "http://storage.local:9000/",
        ))
        .unwrap();

        assert_eq!(
            storage.object_url("chapters/abc.txt"),
            "http://storage.local:9000/chapters/abc.txt"
        );
    }
}
