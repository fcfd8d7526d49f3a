//! Identity and reply publishing collaborators.
//!
//! Access tokens are opaque strings. Tokens starting with `mock_` come from
//! the simulated login flow and are never sent to the platform.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix of tokens issued by the simulated login flow.
pub const MOCK_TOKEN_PREFIX: &str = "mock_";

/// Default YouTube Data API root.
pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Supplies the current access token, if the user is signed in.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}

/// Fixed token, or none.
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn from_option(token: Option<String>) -> Self {
        Self(token)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticToken")
            .field(&self.0.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Show only the leading characters of a token.
pub fn token_preview(token: &str) -> String {
    token.chars().take(10).collect()
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Reply request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for PublishError {
    fn from(e: reqwest::Error) -> Self {
        PublishError::Request(e.to_string())
    }
}

/// Posts a reply under a comment. `Ok(false)` means the platform refused it.
#[async_trait]
pub trait ReplyPublisher: Send + Sync {
    async fn post_reply(&self, token: &str, comment_id: &str, text: &str) -> Result<bool, PublishError>;
}

/// Publisher that only accepts simulated tokens.
#[derive(Debug, Clone)]
pub struct SimulatedPublisher {
    delay: Duration,
}

impl SimulatedPublisher {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedPublisher {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl ReplyPublisher for SimulatedPublisher {
    async fn post_reply(&self, token: &str, comment_id: &str, _text: &str) -> Result<bool, PublishError> {
        if !token.starts_with(MOCK_TOKEN_PREFIX) {
            warn!(comment_id, "Simulated publisher refused a non-simulated token");
            return Ok(false);
        }
        tokio::time::sleep(self.delay).await;
        debug!(comment_id, "Simulated reply posted");
        Ok(true)
    }
}

/// Publishes replies through the YouTube Data API, falling back to the
/// simulated publisher for simulated tokens.
pub struct YoutubeReplyPublisher {
    client: Client,
    base_url: String,
    simulated: SimulatedPublisher,
}

impl YoutubeReplyPublisher {
    pub fn new(base_url: impl Into<String>, simulated: SimulatedPublisher) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            simulated,
        }
    }
}

impl Default for YoutubeReplyPublisher {
    fn default() -> Self {
        Self::new(YOUTUBE_API_BASE, SimulatedPublisher::default())
    }
}

#[async_trait]
impl ReplyPublisher for YoutubeReplyPublisher {
    async fn post_reply(&self, token: &str, comment_id: &str, text: &str) -> Result<bool, PublishError> {
        if token.starts_with(MOCK_TOKEN_PREFIX) {
            return self.simulated.post_reply(token, comment_id, text).await;
        }

        let url = format!("{}/comments", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .query(&[("part", "snippet")])
            .bearer_auth(token)
            .json(&json!({
                "snippet": {
                    "parentId": comment_id,
                    "textOriginal": text,
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(comment_id, %status, "Reply rejected: {}", body);
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("mock_token_abc123"), "mock_token");
        assert_eq!(token_preview("short"), "short");
    }

    #[tokio::test]
    async fn test_static_token() {
        assert_eq!(StaticToken::new("t").access_token().await.as_deref(), Some("t"));
        assert!(StaticToken::none().access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_simulated_publisher() {
        let publisher = SimulatedPublisher::new(Duration::ZERO);
        assert!(publisher.post_reply("mock_token_x", "cm_0", "hi").await.unwrap());
        assert!(!publisher.post_reply("real-token", "cm_0", "hi").await.unwrap());
    }

    #[tokio::test]
    async fn test_youtube_publisher_posts_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/comments"))
            .and(query_param("part", "snippet"))
            .and(header("authorization", "Bearer real-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let publisher = YoutubeReplyPublisher::new(server.uri(), SimulatedPublisher::new(Duration::ZERO));
        assert!(publisher.post_reply("real-token", "cm_0", "thanks").await.unwrap());
    }

    #[tokio::test]
    async fn test_youtube_publisher_reports_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let publisher = YoutubeReplyPublisher::new(server.uri(), SimulatedPublisher::new(Duration::ZERO));
        assert!(!publisher.post_reply("real-token", "cm_0", "thanks").await.unwrap());
    }

    #[tokio::test]
    async fn test_youtube_publisher_never_sends_mock_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let publisher = YoutubeReplyPublisher::new(server.uri(), SimulatedPublisher::new(Duration::ZERO));
        assert!(publisher.post_reply("mock_token_x", "cm_0", "thanks").await.unwrap());
    }
}
