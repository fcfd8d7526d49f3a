//! Deterministic placeholder content.
//!
//! Used when the generation service cannot be reached so a run still
//! produces a complete, inspectable result.

use async_trait::async_trait;
use clipstream_models::{
    youtube_id_or, CaptionItem, Comment, HighlightSegment, Locale, SeoBundle, Sentiment,
    VideoMetadata, PLACEHOLDER_VIDEO_ID,
};

use crate::error::GenAiResult;
use crate::generator::{ContentGenerator, HighlightRequest};

const TRANSCRIPT_LINES: usize = 5;

/// Narration used when no script could be produced.
pub fn narration(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "This scene is amazing. Check it out!",
        Locale::Ko => "이 장면은 정말 놀랍습니다. 확인해보세요!",
    }
}

/// Reply used when the service answered with an empty reply.
pub fn empty_reply(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Thanks for watching! 🔥",
        Locale::Ko => "감사합니다! 🔥",
    }
}

/// Generator returning the fixed placeholder dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

impl OfflineGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn metadata(&self, source_url: &str) -> VideoMetadata {
        let video_id = youtube_id_or(source_url, PLACEHOLDER_VIDEO_ID);
        VideoMetadata {
            thumbnail_url: VideoMetadata::thumbnail_for(&video_id),
            id: video_id,
            title: "Video Title Not Found".to_string(),
            description: "Description unavailable.".to_string(),
            duration: "10:00".to_string(),
            channel_title: "Unknown Channel".to_string(),
            view_count: "0".to_string(),
        }
    }

    pub fn transcript(&self, locale: Locale) -> Vec<CaptionItem> {
        (0..TRANSCRIPT_LINES)
            .map(|i| {
                let start = (i * 5) as f64;
                let text = match locale {
                    Locale::En => format!("Subtitle test line {}", i + 1),
                    Locale::Ko => format!("자막 테스트 라인 {}", i + 1),
                };
                CaptionItem::new(start, start + 4.0, text)
            })
            .collect()
    }

    pub fn highlights(&self) -> Vec<HighlightSegment> {
        vec![HighlightSegment::new(0.0, 30.0, "Fallback")]
    }

    pub fn seo(&self) -> SeoBundle {
        SeoBundle {
            title: "Check this out!".to_string(),
            description: "Amazing clip.".to_string(),
            tags: vec!["shorts".to_string()],
            comment_text: "Wow!".to_string(),
            meta_keywords: vec!["video".to_string()],
            thumbnail_text: "WOW".to_string(),
        }
    }

    pub fn reply(&self) -> String {
        "Thanks!".to_string()
    }
}

#[async_trait]
impl ContentGenerator for OfflineGenerator {
    async fn describe_source(&self, source_url: &str, _locale: Locale) -> GenAiResult<VideoMetadata> {
        Ok(self.metadata(source_url))
    }

    async fn transcribe(&self, _title: &str, locale: Locale) -> GenAiResult<Vec<CaptionItem>> {
        Ok(self.transcript(locale))
    }

    async fn select_highlight(
        &self,
        _transcript: &[CaptionItem],
        _request: HighlightRequest<'_>,
        _locale: Locale,
    ) -> GenAiResult<Vec<HighlightSegment>> {
        Ok(self.highlights())
    }

    async fn write_narration(
        &self,
        _highlight: &HighlightSegment,
        _transcript: &[CaptionItem],
        _style: &str,
        locale: Locale,
    ) -> GenAiResult<String> {
        Ok(narration(locale).to_string())
    }

    async fn build_seo(
        &self,
        _metadata: &VideoMetadata,
        _script: &str,
        _style: &str,
        _locale: Locale,
    ) -> GenAiResult<SeoBundle> {
        Ok(self.seo())
    }

    async fn render_thumbnail(&self, metadata: &VideoMetadata) -> GenAiResult<String> {
        Ok(VideoMetadata::thumbnail_for(&metadata.id))
    }

    async fn collect_comments(&self, _title: &str, _locale: Locale) -> GenAiResult<Vec<Comment>> {
        Ok(Vec::new())
    }

    async fn draft_reply(
        &self,
        _comment_text: &str,
        _sentiment: Sentiment,
        _locale: Locale,
    ) -> GenAiResult<String> {
        Ok(self.reply())
    }
}
