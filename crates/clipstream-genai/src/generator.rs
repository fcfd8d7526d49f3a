//! Content generation contract used by the pipeline steps.

use async_trait::async_trait;
use clipstream_models::{
    CaptionItem, Comment, HighlightSegment, Locale, SeoBundle, Sentiment, VideoMetadata,
};

use crate::error::GenAiResult;

/// Highlight selection request parameters.
#[derive(Debug, Clone, Copy)]
pub struct HighlightRequest<'a> {
    /// Target clip length, e.g. "60s"
    pub target_length: &'a str,
    /// Clip style, e.g. "meme"
    pub style: &'a str,
}

/// External generative content service.
///
/// Every call may be slow and may fail. Implementations report connectivity
/// loss as [`GenAiError::Unreachable`](crate::GenAiError::Unreachable) so a
/// wrapper can decide whether to degrade to placeholder data.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Describe the source video behind `source_url`.
    async fn describe_source(&self, source_url: &str, locale: Locale) -> GenAiResult<VideoMetadata>;

    /// Produce a timestamped transcript for a video title.
    async fn transcribe(&self, title: &str, locale: Locale) -> GenAiResult<Vec<CaptionItem>>;

    /// Pick highlight segments from a transcript. The first one is used.
    async fn select_highlight(
        &self,
        transcript: &[CaptionItem],
        request: HighlightRequest<'_>,
        locale: Locale,
    ) -> GenAiResult<Vec<HighlightSegment>>;

    /// Write a short narration script for a highlight.
    async fn write_narration(
        &self,
        highlight: &HighlightSegment,
        transcript: &[CaptionItem],
        style: &str,
        locale: Locale,
    ) -> GenAiResult<String>;

    /// Build SEO text for the clip.
    async fn build_seo(
        &self,
        metadata: &VideoMetadata,
        script: &str,
        style: &str,
        locale: Locale,
    ) -> GenAiResult<SeoBundle>;

    /// Produce a thumbnail reference for the clip.
    async fn render_thumbnail(&self, metadata: &VideoMetadata) -> GenAiResult<String>;

    /// Fetch recent viewer comments for a video title.
    async fn collect_comments(&self, title: &str, locale: Locale) -> GenAiResult<Vec<Comment>>;

    /// Draft a creator reply to one comment.
    async fn draft_reply(
        &self,
        comment_text: &str,
        sentiment: Sentiment,
        locale: Locale,
    ) -> GenAiResult<String>;
}
