//! Highlight window and overlay caption models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Highlights must start within this many seconds of the source so the
/// preview can be acquired without fetching the whole video.
pub const EARLY_WINDOW_SECS: f64 = 60.0;

/// Number of script words per overlay caption chunk.
pub const CAPTION_CHUNK_WORDS: usize = 5;

/// Selected sub-interval of the source timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighlightSegment {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    /// Why this segment was chosen
    #[serde(default)]
    pub reason: String,
}

impl HighlightSegment {
    pub fn new(start: f64, end: f64, reason: impl Into<String>) -> Self {
        Self {
            start,
            end,
            reason: reason.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Check ordering and the early-window constraint.
    pub fn validate(&self) -> Result<(), HighlightError> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start < 0.0 {
            return Err(HighlightError::InvalidBounds {
                start: self.start,
                end: self.end,
            });
        }
        if self.start > self.end {
            return Err(HighlightError::InvalidBounds {
                start: self.start,
                end: self.end,
            });
        }
        if self.start > EARLY_WINDOW_SECS {
            return Err(HighlightError::OutsideEarlyWindow { start: self.start });
        }
        Ok(())
    }
}

/// Highlight constraint violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HighlightError {
    #[error("highlight bounds are invalid: start={start}, end={end}")]
    InvalidBounds { start: f64, end: f64 },

    #[error("highlight starts at {start}s, beyond the {EARLY_WINDOW_SECS}s preview window")]
    OutsideEarlyWindow { start: f64 },
}

/// Timed caption chunk, relative to the highlight start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaptionSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl CaptionSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Half-open containment: `start <= t < end`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Split a narration script into fixed-size word groups and spread them
/// evenly over `duration` seconds.
pub fn chunk_script(script: &str, duration: f64) -> Vec<CaptionSegment> {
    let words: Vec<&str> = script.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let chunks: Vec<String> = words
        .chunks(CAPTION_CHUNK_WORDS)
        .map(|chunk| chunk.join(" "))
        .collect();

    let step = duration.max(0.0) / chunks.len() as f64;
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, text)| CaptionSegment::new(i as f64 * step, (i + 1) as f64 * step, text))
        .collect()
}

/// Build the embedded-player reference that plays `highlight` on loop.
pub fn embed_reference(video_id: &str, highlight: &HighlightSegment) -> String {
    let start = highlight.start.floor() as i64;
    let end = highlight.end.ceil() as i64;
    format!(
        "https://www.youtube.com/embed/{id}?start={start}&end={end}&autoplay=1&mute=1&rel=0&modestbranding=1&controls=0&loop=1&playlist={id}",
        id = video_id,
        start = start,
        end = end,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_script_even_split() {
        let script = "one two three four five six seven eight nine ten eleven";
        let captions = chunk_script(script, 30.0);

        assert_eq!(captions.len(), 3);
        assert_eq!(captions[0].text, "one two three four five");
        assert_eq!(captions[2].text, "eleven");
        assert!((captions[0].end - 10.0).abs() < 1e-9);
        assert!((captions[2].end - 30.0).abs() < 1e-9);
        for pair in captions.windows(2) {
            assert!((pair[0].end - pair[1].start).abs() < 1e-9);
        }
    }

    #[test]
    fn test_chunk_script_empty() {
        assert!(chunk_script("   ", 30.0).is_empty());
    }

    #[test]
    fn test_highlight_validation() {
        assert!(HighlightSegment::new(10.0, 40.0, "ok").validate().is_ok());
        assert!(matches!(
            HighlightSegment::new(40.0, 10.0, "").validate(),
            Err(HighlightError::InvalidBounds { .. })
        ));
        assert!(matches!(
            HighlightSegment::new(75.0, 100.0, "").validate(),
            Err(HighlightError::OutsideEarlyWindow { .. })
        ));
    }

    #[test]
    fn test_embed_reference_rounds_outward() {
        let url = embed_reference("dQw4w9WgXcQ", &HighlightSegment::new(10.4, 39.2, ""));
        assert!(url.starts_with("https://www.youtube.com/embed/dQw4w9WgXcQ?"));
        assert!(url.contains("start=10&end=40"));
        assert!(url.ends_with("playlist=dQw4w9WgXcQ"));
    }

    #[test]
    fn test_caption_contains_half_open() {
        let c = CaptionSegment::new(10.0, 25.0, "x");
        assert!(c.contains(10.0));
        assert!(c.contains(24.999));
        assert!(!c.contains(25.0));
    }
}
