//! Gemini REST client for content generation.
//!
//! Talks to the `generateContent` endpoint, asks for JSON output where a
//! structured answer is needed and walks the configured model list until one
//! of them produces a usable response.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use clipstream_models::{
    comment::avatar_for, youtube_id_or, CaptionItem, Comment, HighlightSegment, Locale, SeoBundle,
    Sentiment, VideoMetadata, PLACEHOLDER_VIDEO_ID,
};

use crate::config::GeminiConfig;
use crate::error::{GenAiError, GenAiResult};
use crate::generator::{ContentGenerator, HighlightRequest};
use crate::offline;
use crate::prompts;

const JSON_MIME: &str = "application/json";

/// Gemini API client.
pub struct GeminiClient {
    config: GeminiConfig,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig<'a> {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataPayload {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    view_count: String,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    author: String,
    text: String,
    #[serde(default)]
    likes: u32,
    #[serde(default)]
    sentiment: Sentiment,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> GenAiResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GenAiError::config("GEMINI_API_KEY not set"))?;
        if config.models.is_empty() {
            return Err(GenAiError::config("No Gemini models configured"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenAiError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        Self::new(GeminiConfig::from_env())
    }

    /// Request a JSON answer and decode it as `T`.
    async fn generate_json<T: DeserializeOwned>(&self, prompt: &str) -> GenAiResult<T> {
        self.generate(prompt, Some(JSON_MIME), |text| {
            serde_json::from_str(strip_code_fences(text)).map_err(|e| {
                GenAiError::invalid_response(format!("Failed to parse JSON payload: {}", e))
            })
        })
        .await
    }

    /// Request a plain-text answer.
    async fn generate_text(&self, prompt: &str) -> GenAiResult<String> {
        self.generate(prompt, None, |text| Ok(text.trim().to_string()))
            .await
    }

    /// Try each configured model in order, returning the first usable answer.
    async fn generate<T, F>(&self, prompt: &str, mime: Option<&str>, parse: F) -> GenAiResult<T>
    where
        F: Fn(&str) -> GenAiResult<T>,
    {
        let mut last_error = None;

        for model in &self.config.models {
            debug!("Attempting Gemini API with model: {}", model);
            let attempt = match self.call_gemini_api(model, prompt, mime).await {
                Ok(text) => parse(&text),
                Err(e) => Err(e),
            };
            match attempt {
                Ok(value) => {
                    info!("Gemini response accepted from {}", model);
                    return Ok(value);
                }
                Err(e) => {
                    warn!("Failed with model {}: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GenAiError::config("No Gemini models configured")))
    }

    /// Call the `generateContent` endpoint and return the first text part.
    async fn call_gemini_api(
        &self,
        model: &str,
        prompt: &str,
        mime: Option<&str>,
    ) -> GenAiResult<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: mime.map(|m| GenerationConfig {
                response_mime_type: m,
            }),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenAiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            GenAiError::invalid_response(format!("Failed to parse Gemini response: {}", e))
        })?;

        gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| GenAiError::invalid_response("No content in Gemini response"))
    }
}

/// Strip a surrounding markdown code fence, if any.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn describe_source(&self, source_url: &str, locale: Locale) -> GenAiResult<VideoMetadata> {
        let video_id = youtube_id_or(source_url, PLACEHOLDER_VIDEO_ID);
        let payload: MetadataPayload = self
            .generate_json(&prompts::metadata_prompt(&video_id, locale))
            .await?;

        // The model may invent an id or thumbnail; the source decides both.
        Ok(VideoMetadata {
            thumbnail_url: VideoMetadata::thumbnail_for(&video_id),
            id: video_id,
            title: payload.title,
            description: payload.description,
            duration: payload.duration,
            channel_title: payload.channel_title,
            view_count: payload.view_count,
        })
    }

    async fn transcribe(&self, title: &str, locale: Locale) -> GenAiResult<Vec<CaptionItem>> {
        self.generate_json(&prompts::transcript_prompt(title, locale))
            .await
    }

    async fn select_highlight(
        &self,
        transcript: &[CaptionItem],
        request: HighlightRequest<'_>,
        locale: Locale,
    ) -> GenAiResult<Vec<HighlightSegment>> {
        self.generate_json(&prompts::highlight_prompt(transcript, request, locale))
            .await
    }

    async fn write_narration(
        &self,
        highlight: &HighlightSegment,
        transcript: &[CaptionItem],
        style: &str,
        locale: Locale,
    ) -> GenAiResult<String> {
        let script = self
            .generate_text(&prompts::narration_prompt(highlight, transcript, style, locale))
            .await?;
        if script.is_empty() {
            return Ok(offline::narration(locale).to_string());
        }
        Ok(script)
    }

    async fn build_seo(
        &self,
        metadata: &VideoMetadata,
        script: &str,
        style: &str,
        locale: Locale,
    ) -> GenAiResult<SeoBundle> {
        self.generate_json(&prompts::seo_prompt(&metadata.title, script, style, locale))
            .await
    }

    async fn render_thumbnail(&self, metadata: &VideoMetadata) -> GenAiResult<String> {
        if metadata.thumbnail_url.is_empty() {
            return Ok(VideoMetadata::thumbnail_for(&metadata.id));
        }
        Ok(metadata.thumbnail_url.clone())
    }

    async fn collect_comments(&self, title: &str, locale: Locale) -> GenAiResult<Vec<Comment>> {
        let payloads: Vec<CommentPayload> = self
            .generate_json(&prompts::comments_prompt(title, locale))
            .await?;

        Ok(payloads
            .into_iter()
            .enumerate()
            .map(|(i, c)| Comment {
                id: format!("cm_{}", i),
                avatar: avatar_for(&c.author),
                author: c.author,
                text: c.text,
                timestamp: format!("{}h ago", i + 1),
                likes: c.likes,
                sentiment: c.sentiment,
                reply: None,
                is_replied: false,
            })
            .collect())
    }

    async fn draft_reply(
        &self,
        comment_text: &str,
        sentiment: Sentiment,
        locale: Locale,
    ) -> GenAiResult<String> {
        let reply = self
            .generate_text(&prompts::reply_prompt(comment_text, sentiment, locale))
            .await?;
        if reply.is_empty() {
            return Ok(offline::empty_reply(locale).to_string());
        }
        Ok(reply)
    }
}
