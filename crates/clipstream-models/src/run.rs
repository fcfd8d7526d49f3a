//! Run identity and user-supplied run options.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::video::MediaHandle;

/// Unique identifier for one pipeline run (reset starts a new one).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options the user chose for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunInput {
    /// Source video reference (untrusted)
    pub source_url: String,
    #[serde(default = "default_clip_length")]
    pub clip_length: String,
    #[serde(default = "default_clip_style")]
    pub clip_style: String,
    #[serde(default = "default_voice_style")]
    pub voice_style: String,
    /// Overlay caption style, e.g. "Bold Overlay"
    #[serde(default = "default_title_style")]
    pub title_style: String,
    /// Affiliate links, separated by commas or whitespace
    #[serde(default)]
    pub shopping_links: String,
    /// Locally acquired media, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_media: Option<MediaHandle>,
}

fn default_clip_length() -> String {
    "60s".to_string()
}

fn default_clip_style() -> String {
    "meme".to_string()
}

fn default_voice_style() -> String {
    "Energetic".to_string()
}

fn default_title_style() -> String {
    "Bold Overlay".to_string()
}

impl RunInput {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            clip_length: default_clip_length(),
            clip_style: default_clip_style(),
            voice_style: default_voice_style(),
            title_style: default_title_style(),
            shopping_links: String::new(),
            local_media: None,
        }
    }

    pub fn with_local_media(mut self, media: MediaHandle) -> Self {
        self.local_media = Some(media);
        self
    }

    pub fn with_clip_length(mut self, clip_length: impl Into<String>) -> Self {
        self.clip_length = clip_length.into();
        self
    }

    pub fn with_clip_style(mut self, clip_style: impl Into<String>) -> Self {
        self.clip_style = clip_style.into();
        self
    }

    pub fn with_shopping_links(mut self, links: impl Into<String>) -> Self {
        self.shopping_links = links.into();
        self
    }

    /// Individual affiliate links, in input order.
    pub fn shopping_link_list(&self) -> Vec<String> {
        self.shopping_links
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|link| !link.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Default for RunInput {
    fn default() -> Self {
        Self::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    }
}
