//! Preview error types.

use thiserror::Error;

pub type PreviewResult<T> = Result<T, PreviewError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreviewError {
    #[error("Invalid playback window: start={start}, end={end}")]
    InvalidWindow { start: f64, end: f64 },

    #[error("Pipeline result has no rendered highlight")]
    MissingHighlight,
}
