//! Looping playback window and caption resolution.

use clipstream_models::{CaptionSegment, HighlightSegment};

use crate::error::{PreviewError, PreviewResult};

/// The looping `[start, end)` interval of the source being previewed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackWindow {
    start: f64,
    end: f64,
}

impl PlaybackWindow {
    pub fn new(start: f64, end: f64) -> PreviewResult<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return Err(PreviewError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn from_highlight(highlight: &HighlightSegment) -> PreviewResult<Self> {
        Self::new(highlight.start, highlight.end)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether a source position has run past the window.
    pub fn is_past_end(&self, position: f64) -> bool {
        position >= self.end
    }

    /// Offset of a source position into the window, clamped at zero.
    pub fn relative(&self, position: f64) -> f64 {
        (position - self.start).max(0.0)
    }

    /// Offset into the window after `elapsed` seconds of looping playback.
    pub fn looped(&self, elapsed: f64) -> f64 {
        elapsed.max(0.0) % self.duration()
    }
}

/// Caption to show at `relative` seconds into the window.
///
/// First caption whose `[start, end)` contains the offset; when none does
/// (gaps, rounding at the edges) the first caption is shown. `None` only for
/// an empty caption list.
pub fn resolve_caption(captions: &[CaptionSegment], relative: f64) -> Option<&CaptionSegment> {
    captions
        .iter()
        .find(|c| c.contains(relative))
        .or_else(|| captions.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captions() -> Vec<CaptionSegment> {
        vec![
            CaptionSegment::new(0.0, 10.0, "a"),
            CaptionSegment::new(10.0, 25.0, "b"),
            CaptionSegment::new(25.0, 30.0, "c"),
        ]
    }

    #[test]
    fn test_window_validation() {
        tokio_test::assert_ok!(PlaybackWindow::new(10.0, 40.0));
        assert_eq!(
            PlaybackWindow::new(40.0, 40.0),
            Err(PreviewError::InvalidWindow {
                start: 40.0,
                end: 40.0
            })
        );
        tokio_test::assert_err!(PlaybackWindow::new(-1.0, 5.0));
        tokio_test::assert_err!(PlaybackWindow::new(0.0, f64::NAN));
    }

    #[test]
    fn test_position_32_in_10_40_resolves_second_caption() {
        let window = PlaybackWindow::new(10.0, 40.0).unwrap();
        let relative = window.relative(32.0);
        assert_eq!(relative, 22.0);
        assert_eq!(resolve_caption(&captions(), relative).unwrap().text, "b");
    }

    #[test]
    fn test_relative_clamps_before_start() {
        let window = PlaybackWindow::new(10.0, 40.0).unwrap();
        assert_eq!(window.relative(3.0), 0.0);
        assert!(window.is_past_end(40.0));
        assert!(!window.is_past_end(39.99));
    }

    #[test]
    fn test_looped_wraps_at_duration() {
        let window = PlaybackWindow::new(10.0, 40.0).unwrap();
        assert_eq!(window.looped(5.0), 5.0);
        assert_eq!(window.looped(30.0), 0.0);
        assert_eq!(window.looped(65.0), 5.0);
    }

    #[test]
    fn test_resolution_is_total_on_non_empty_lists() {
        let caps = captions();
        let mut t = 0.0;
        while t < 30.0 {
            assert!(resolve_caption(&caps, t).is_some(), "no caption at {t}");
            t += 0.25;
        }
        // Past the last caption falls back to the first.
        assert_eq!(resolve_caption(&caps, 31.0).unwrap().text, "a");
        assert!(resolve_caption(&[], 1.0).is_none());
    }

    #[test]
    fn test_gap_falls_back_to_first_caption() {
        let caps = vec![
            CaptionSegment::new(0.5, 10.0, "a"),
            CaptionSegment::new(12.0, 20.0, "b"),
        ];
        assert_eq!(resolve_caption(&caps, 0.2).unwrap().text, "a");
        assert_eq!(resolve_caption(&caps, 11.0).unwrap().text, "a");
        assert_eq!(resolve_caption(&caps, 12.0).unwrap().text, "b");
    }
}
