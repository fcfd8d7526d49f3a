//! Source video models: metadata, transcript lines, local media handles.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fallback video id used when none can be extracted from a reference.
pub const PLACEHOLDER_VIDEO_ID: &str = "dQw4w9WgXcQ";

/// Descriptive metadata of the source video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// 11-character platform video id
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Human-readable duration, e.g. "10:00"
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub view_count: String,
}

impl VideoMetadata {
    /// Canonical max-resolution thumbnail URL for a video id.
    pub fn thumbnail_for(video_id: &str) -> String {
        format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id)
    }
}

/// One timestamped transcript line, in source-timeline seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaptionItem {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl CaptionItem {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether this line lies entirely inside `[start, end]`.
    pub fn within(&self, start: f64, end: f64) -> bool {
        self.start >= start && self.end <= end
    }
}

/// Locally addressable media acquired for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaHandle {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
}

impl MediaHandle {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source.mp4".to_string());
        Self {
            path,
            file_name,
            size_bytes,
        }
    }

    /// Size in mebibytes, for log lines.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}
