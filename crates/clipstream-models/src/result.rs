//! Accumulating pipeline output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::comment::{AutoReplyStats, Comment};
use crate::highlight::{CaptionSegment, HighlightSegment};
use crate::seo::SeoBundle;
use crate::video::{CaptionItem, MediaHandle, VideoMetadata};

/// Path recorded when no local media was supplied.
pub const VIRTUAL_SOURCE_PATH: &str = "/tmp/source.mp4";

/// Output accumulated across stage runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub metadata: Option<VideoMetadata>,
    /// Transcript of the source, in source time
    #[serde(default)]
    pub transcript: Vec<CaptionItem>,
    #[serde(default)]
    pub video_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_media: Option<MediaHandle>,
    /// Rendering outputs as they become available
    #[serde(default)]
    pub draft: StageBDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_b: Option<StageBResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_c: Option<StageCResult>,
}

impl PipelineResult {
    /// First highlight of the finished rendering stage.
    pub fn primary_highlight(&self) -> Option<&HighlightSegment> {
        self.stage_b.as_ref().and_then(|b| b.highlights.first())
    }

    pub fn has_local_media(&self) -> bool {
        self.local_media.is_some()
    }
}

/// Partially assembled rendering output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageBDraft {
    #[serde(default)]
    pub highlights: Vec<HighlightSegment>,
    pub preview_reference: Option<String>,
    pub script: Option<String>,
    #[serde(default)]
    pub overlay_captions: Vec<CaptionSegment>,
    pub thumbnail: Option<String>,
    pub seo: Option<SeoBundle>,
}

impl StageBDraft {
    /// Assemble the final bundle. Returns the name of the first missing part
    /// if the draft is incomplete.
    pub fn finish(&self) -> Result<StageBResult, &'static str> {
        if self.highlights.is_empty() {
            return Err("highlights");
        }
        let generated_video_url = self.preview_reference.clone().ok_or("preview reference")?;
        let generated_script = self.script.clone().ok_or("script")?;
        let thumbnail = self.thumbnail.clone().ok_or("thumbnail")?;
        let seo = self.seo.clone().ok_or("seo")?;

        Ok(StageBResult {
            highlights: self.highlights.clone(),
            thumbnails: vec![thumbnail],
            product_summaries: Vec::new(),
            seo,
            generated_video_url,
            generated_script,
            overlay_subtitles: self.overlay_captions.clone(),
        })
    }
}

/// Finished rendering output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageBResult {
    pub highlights: Vec<HighlightSegment>,
    pub thumbnails: Vec<String>,
    pub product_summaries: Vec<String>,
    pub seo: SeoBundle,
    /// Embed reference playing the highlight on loop
    pub generated_video_url: String,
    pub generated_script: String,
    pub overlay_subtitles: Vec<CaptionSegment>,
}

/// Engagement output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageCResult {
    pub comments: Vec<Comment>,
    pub auto_reply_stats: AutoReplyStats,
}
