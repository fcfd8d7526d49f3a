//! Shared data models for the ClipStream pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Steps, stages and the stage definition table
//! - Source metadata, transcripts and media handles
//! - Highlight windows and overlay captions
//! - SEO bundles, comments and the accumulating pipeline result

pub mod comment;
pub mod highlight;
pub mod locale;
pub mod result;
pub mod run;
pub mod seo;
pub mod stage;
pub mod step;
pub mod utils;
pub mod video;

// Re-export common types
pub use comment::{AutoReplyStats, Comment, Sentiment};
pub use highlight::{
    chunk_script, embed_reference, CaptionSegment, HighlightError, HighlightSegment,
    EARLY_WINDOW_SECS,
};
pub use locale::Locale;
pub use result::{PipelineResult, StageBDraft, StageBResult, StageCResult, VIRTUAL_SOURCE_PATH};
pub use run::{RunId, RunInput};
pub use seo::SeoBundle;
pub use stage::{step_label, StageId};
pub use step::{StepId, StepState, StepStatus, StepView};
pub use utils::{extract_youtube_id, youtube_id_or, YoutubeIdError, YoutubeIdResult};
pub use video::{CaptionItem, MediaHandle, VideoMetadata, PLACEHOLDER_VIDEO_ID};
