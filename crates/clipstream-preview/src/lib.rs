//! Synchronized preview for ClipStream.
//!
//! Loops a highlight window and tracks the active overlay caption, over a
//! controllable local player or an opaque remote one.

pub mod config;
pub mod engine;
pub mod error;
pub mod player;
pub mod task;
pub mod window;

pub use config::PreviewConfig;
pub use engine::{PreviewEngine, PreviewSource, PreviewState};
pub use error::{PreviewError, PreviewResult};
pub use player::{ClockPlayer, PlaybackHandle};
pub use task::ScheduledTask;
pub use window::{resolve_caption, PlaybackWindow};
