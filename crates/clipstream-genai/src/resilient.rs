//! Fallback wrapper around a content generator.

use async_trait::async_trait;
use clipstream_models::{
    CaptionItem, Comment, HighlightSegment, Locale, SeoBundle, Sentiment, VideoMetadata,
};
use tracing::warn;

use crate::error::{GenAiError, GenAiResult};
use crate::generator::{ContentGenerator, HighlightRequest};
use crate::offline::OfflineGenerator;

/// Delegates to an inner generator and substitutes placeholder content when,
/// and only when, the inner generator reports the service as unreachable.
///
/// Every other failure (bad status, unusable payload) propagates unchanged.
pub struct ResilientGenerator<G> {
    inner: G,
    offline: OfflineGenerator,
}

impl<G: ContentGenerator> ResilientGenerator<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            offline: OfflineGenerator::new(),
        }
    }
}

/// Resolve a delegated call, degrading to `fallback` on connectivity loss.
fn degrade<T>(operation: &str, result: GenAiResult<T>, fallback: impl FnOnce() -> T) -> GenAiResult<T> {
    match result {
        Err(GenAiError::Unreachable(reason)) => {
            warn!(
                operation = operation,
                reason = %reason,
                "Generation service unreachable, using placeholder content"
            );
            Ok(fallback())
        }
        other => other,
    }
}

#[async_trait]
impl<G: ContentGenerator> ContentGenerator for ResilientGenerator<G> {
    async fn describe_source(&self, source_url: &str, locale: Locale) -> GenAiResult<VideoMetadata> {
        let result = self.inner.describe_source(source_url, locale).await;
        degrade("describe_source", result, || self.offline.metadata(source_url))
    }

    async fn transcribe(&self, title: &str, locale: Locale) -> GenAiResult<Vec<CaptionItem>> {
        let result = self.inner.transcribe(title, locale).await;
        degrade("transcribe", result, || self.offline.transcript(locale))
    }

    async fn select_highlight(
        &self,
        transcript: &[CaptionItem],
        request: HighlightRequest<'_>,
        locale: Locale,
    ) -> GenAiResult<Vec<HighlightSegment>> {
        let result = self.inner.select_highlight(transcript, request, locale).await;
        degrade("select_highlight", result, || self.offline.highlights())
    }

    async fn write_narration(
        &self,
        highlight: &HighlightSegment,
        transcript: &[CaptionItem],
        style: &str,
        locale: Locale,
    ) -> GenAiResult<String> {
        let result = self
            .inner
            .write_narration(highlight, transcript, style, locale)
            .await;
        degrade("write_narration", result, || {
            crate::offline::narration(locale).to_string()
        })
    }

    async fn build_seo(
        &self,
        metadata: &VideoMetadata,
        script: &str,
        style: &str,
        locale: Locale,
    ) -> GenAiResult<SeoBundle> {
        let result = self.inner.build_seo(metadata, script, style, locale).await;
        degrade("build_seo", result, || self.offline.seo())
    }

    async fn render_thumbnail(&self, metadata: &VideoMetadata) -> GenAiResult<String> {
        let result = self.inner.render_thumbnail(metadata).await;
        degrade("render_thumbnail", result, || {
            VideoMetadata::thumbnail_for(&metadata.id)
        })
    }

    async fn collect_comments(&self, title: &str, locale: Locale) -> GenAiResult<Vec<Comment>> {
        let result = self.inner.collect_comments(title, locale).await;
        degrade("collect_comments", result, Vec::new)
    }

    async fn draft_reply(
        &self,
        comment_text: &str,
        sentiment: Sentiment,
        locale: Locale,
    ) -> GenAiResult<String> {
        let result = self.inner.draft_reply(comment_text, sentiment, locale).await;
        degrade("draft_reply", result, || self.offline.reply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generator whose every call fails with a fixed error kind.
    struct Failing {
        unreachable: bool,
    }

    impl Failing {
        fn error(&self) -> GenAiError {
            if self.unreachable {
                GenAiError::unreachable("connection refused")
            } else {
                GenAiError::Api {
                    status: 429,
                    body: "quota".into(),
                }
            }
        }
    }

    #[async_trait]
    impl ContentGenerator for Failing {
        async fn describe_source(&self, _: &str, _: Locale) -> GenAiResult<VideoMetadata> {
            Err(self.error())
        }
        async fn transcribe(&self, _: &str, _: Locale) -> GenAiResult<Vec<CaptionItem>> {
            Err(self.error())
        }
        async fn select_highlight(
            &self,
            _: &[CaptionItem],
            _: HighlightRequest<'_>,
            _: Locale,
        ) -> GenAiResult<Vec<HighlightSegment>> {
            Err(self.error())
        }
        async fn write_narration(
            &self,
            _: &HighlightSegment,
            _: &[CaptionItem],
            _: &str,
            _: Locale,
        ) -> GenAiResult<String> {
            Err(self.error())
        }
        async fn build_seo(&self, _: &VideoMetadata, _: &str, _: &str, _: Locale) -> GenAiResult<SeoBundle> {
            Err(self.error())
        }
        async fn render_thumbnail(&self, _: &VideoMetadata) -> GenAiResult<String> {
            Err(self.error())
        }
        async fn collect_comments(&self, _: &str, _: Locale) -> GenAiResult<Vec<Comment>> {
            Err(self.error())
        }
        async fn draft_reply(&self, _: &str, _: Sentiment, _: Locale) -> GenAiResult<String> {
            Err(self.error())
        }
    }

    #[tokio::test]
    async fn test_substitutes_placeholders_when_unreachable() {
        let gen = ResilientGenerator::new(Failing { unreachable: true });

        let meta = gen
            .describe_source("https://youtu.be/jfKfPfyJRdk", Locale::En)
            .await
            .unwrap();
        assert_eq!(meta.title, "Video Title Not Found");
        assert_eq!(meta.id, "jfKfPfyJRdk");

        let transcript = gen.transcribe(&meta.title, Locale::En).await.unwrap();
        assert_eq!(transcript.len(), 5);

        let script = gen
            .write_narration(&HighlightSegment::new(0.0, 30.0, ""), &transcript, "x", Locale::En)
            .await
            .unwrap();
        assert_eq!(script, "This scene is amazing. Check it out!");
        assert_eq!(
            gen.draft_reply("hi", Sentiment::Neutral, Locale::En).await.unwrap(),
            "Thanks!"
        );
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let gen = ResilientGenerator::new(Failing { unreachable: false });

        let err = gen
            .describe_source("https://youtu.be/jfKfPfyJRdk", Locale::En)
            .await
            .unwrap_err();
        assert!(matches!(err, GenAiError::Api { status: 429, .. }));
        tokio_test::assert_err!(gen.collect_comments("t", Locale::En).await);
    }
}
