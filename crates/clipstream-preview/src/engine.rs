//! Synchronized preview engine.
//!
//! Loops the highlight window of the source and keeps the active overlay
//! caption in step with it. Two substrates are supported:
//!
//! - [`PreviewSource::Local`]: a controllable player. The engine seeks it to
//!   the window start, listens to position notifications and seeks back when
//!   playback runs past the window end.
//! - [`PreviewSource::Remote`]: an opaque embedded player that loops on its
//!   own. The engine cannot observe it, so the caption follows a local clock
//!   started when playback began.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clipstream_models::{CaptionSegment, PipelineResult};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::config::PreviewConfig;
use crate::error::{PreviewError, PreviewResult};
use crate::player::PlaybackHandle;
use crate::task::ScheduledTask;
use crate::window::{resolve_caption, PlaybackWindow};

/// Media substrate behind the preview.
#[derive(Clone)]
pub enum PreviewSource {
    Local(Arc<dyn PlaybackHandle>),
    /// Embed reference of an opaque player
    Remote(String),
}

impl fmt::Debug for PreviewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewSource::Local(_) => f.write_str("Local(..)"),
            PreviewSource::Remote(reference) => f.debug_tuple("Remote").field(reference).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Stopped,
    Playing,
}

type CaptionSender = Arc<watch::Sender<Option<String>>>;

pub struct PreviewEngine {
    window: PlaybackWindow,
    captions: Arc<[CaptionSegment]>,
    source: PreviewSource,
    config: PreviewConfig,
    state: PreviewState,
    playing: Arc<AtomicBool>,
    caption: CaptionSender,
    task: Option<ScheduledTask>,
}

impl PreviewEngine {
    pub fn new(
        window: PlaybackWindow,
        captions: Vec<CaptionSegment>,
        source: PreviewSource,
        config: PreviewConfig,
    ) -> Self {
        let (caption, _) = watch::channel(None);
        Self {
            window,
            captions: captions.into(),
            source,
            config,
            state: PreviewState::Stopped,
            playing: Arc::new(AtomicBool::new(false)),
            caption: Arc::new(caption),
            task: None,
        }
    }

    /// Build from a finished rendering stage: first highlight, overlay captions.
    pub fn from_result(
        result: &PipelineResult,
        source: PreviewSource,
        config: PreviewConfig,
    ) -> PreviewResult<Self> {
        let highlight = result
            .primary_highlight()
            .ok_or(PreviewError::MissingHighlight)?;
        let window = PlaybackWindow::from_highlight(highlight)?;
        let captions = result
            .stage_b
            .as_ref()
            .map(|b| b.overlay_subtitles.clone())
            .unwrap_or_default();
        Ok(Self::new(window, captions, source, config))
    }

    /// Remote source pointing at the rendered preview reference.
    pub fn remote_source(result: &PipelineResult) -> PreviewResult<PreviewSource> {
        result
            .stage_b
            .as_ref()
            .map(|b| PreviewSource::Remote(b.generated_video_url.clone()))
            .ok_or(PreviewError::MissingHighlight)
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn window(&self) -> PlaybackWindow {
        self.window
    }

    pub fn active_caption(&self) -> Option<String> {
        self.caption.borrow().clone()
    }

    pub fn subscribe_caption(&self) -> watch::Receiver<Option<String>> {
        self.caption.subscribe()
    }

    /// Enter Playing. Must be called inside a Tokio runtime.
    pub fn play(&mut self) {
        if self.state == PreviewState::Playing {
            return;
        }
        self.state = PreviewState::Playing;
        self.playing.store(true, Ordering::SeqCst);
        let epoch = Instant::now();

        let task = match &self.source {
            PreviewSource::Local(handle) => {
                handle.seek(self.window.start());
                handle.play();
                ScheduledTask::spawn(track_local(
                    handle.clone(),
                    self.window,
                    self.captions.clone(),
                    self.playing.clone(),
                    self.caption.clone(),
                ))
            }
            PreviewSource::Remote(reference) => {
                debug!(reference = %reference, "Following remote preview by clock");
                ScheduledTask::spawn(follow_remote(
                    self.window,
                    self.captions.clone(),
                    epoch,
                    self.config.tick,
                    self.playing.clone(),
                    self.caption.clone(),
                ))
            }
        };
        self.task = Some(task);
    }

    /// Enter Stopped: cancel tracking, pause local media, clear the caption.
    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
        self.playing.store(false, Ordering::SeqCst);
        if let PreviewSource::Local(handle) = &self.source {
            handle.pause();
        }
        self.caption.send_if_modified(|current| current.take().is_some());
        self.state = PreviewState::Stopped;
    }

    pub fn toggle(&mut self) {
        match self.state {
            PreviewState::Playing => self.stop(),
            PreviewState::Stopped => self.play(),
        }
    }
}

/// Publish the caption for the current position.
///
/// `playing` is read under the channel lock: once `stop` has cleared the
/// caption, a tracking task that is still mid-poll cannot bring it back.
fn publish(
    caption: &watch::Sender<Option<String>>,
    playing: &AtomicBool,
    segment: Option<&CaptionSegment>,
) {
    let next = segment.map(|s| s.text.as_str());
    caption.send_if_modified(|current| {
        if !playing.load(Ordering::SeqCst) || current.as_deref() == next {
            return false;
        }
        *current = next.map(String::from);
        true
    });
}

async fn track_local(
    handle: Arc<dyn PlaybackHandle>,
    window: PlaybackWindow,
    captions: Arc<[CaptionSegment]>,
    playing: Arc<AtomicBool>,
    caption: CaptionSender,
) {
    let mut positions = handle.subscribe_position();
    loop {
        let position = *positions.borrow_and_update();
        let relative = if window.is_past_end(position) {
            handle.seek(window.start());
            if playing.load(Ordering::SeqCst) {
                handle.play();
            }
            0.0
        } else {
            window.relative(position)
        };
        publish(&caption, &playing, resolve_caption(&captions, relative));

        if positions.changed().await.is_err() {
            break;
        }
    }
}

async fn follow_remote(
    window: PlaybackWindow,
    captions: Arc<[CaptionSegment]>,
    epoch: Instant,
    tick: Duration,
    playing: Arc<AtomicBool>,
    caption: CaptionSender,
) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let relative = window.looped(epoch.elapsed().as_secs_f64());
        publish(&caption, &playing, resolve_caption(&captions, relative));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use clipstream_models::{HighlightSegment, SeoBundle, StageBResult};
    use tokio::time::timeout;

    use crate::player::ClockPlayer;

    /// Player whose position is driven by the test.
    struct ManualPlayer {
        positions: watch::Sender<f64>,
        seeks: Mutex<Vec<f64>>,
        plays: AtomicUsize,
        pauses: AtomicUsize,
    }

    impl ManualPlayer {
        fn new() -> Arc<Self> {
            let (positions, _) = watch::channel(0.0);
            Arc::new(Self {
                positions,
                seeks: Mutex::new(Vec::new()),
                plays: AtomicUsize::new(0),
                pauses: AtomicUsize::new(0),
            })
        }

        fn report(&self, position: f64) {
            self.positions.send_replace(position);
        }
    }

    impl PlaybackHandle for ManualPlayer {
        fn position(&self) -> f64 {
            *self.positions.borrow()
        }
        fn seek(&self, position: f64) {
            self.seeks.lock().unwrap().push(position);
            self.positions.send_replace(position);
        }
        fn play(&self) {
            self.plays.fetch_add(1, Ordering::SeqCst);
        }
        fn pause(&self) {
            self.pauses.fetch_add(1, Ordering::SeqCst);
        }
        fn subscribe_position(&self) -> watch::Receiver<f64> {
            self.positions.subscribe()
        }
    }

    fn captions() -> Vec<CaptionSegment> {
        vec![
            CaptionSegment::new(0.0, 10.0, "a"),
            CaptionSegment::new(10.0, 25.0, "b"),
            CaptionSegment::new(25.0, 30.0, "c"),
        ]
    }

    async fn wait_for_caption(rx: &mut watch::Receiver<Option<String>>, expected: Option<&str>) {
        timeout(Duration::from_secs(1), rx.wait_for(|c| c.as_deref() == expected))
            .await
            .expect("caption did not arrive in time")
            .expect("caption channel closed");
    }

    #[tokio::test]
    async fn test_local_playback_tracks_position_and_loops() {
        let player = ManualPlayer::new();
        let mut engine = PreviewEngine::new(
            PlaybackWindow::new(10.0, 40.0).unwrap(),
            captions(),
            PreviewSource::Local(player.clone()),
            PreviewConfig::default(),
        );
        let mut rx = engine.subscribe_caption();

        engine.play();
        assert_eq!(engine.state(), PreviewState::Playing);
        assert_eq!(*player.seeks.lock().unwrap(), vec![10.0]);
        assert_eq!(player.plays.load(Ordering::SeqCst), 1);
        wait_for_caption(&mut rx, Some("a")).await;

        player.report(32.0);
        wait_for_caption(&mut rx, Some("b")).await;

        player.report(41.0);
        wait_for_caption(&mut rx, Some("a")).await;
        assert_eq!(*player.seeks.lock().unwrap(), vec![10.0, 10.0]);
        assert_eq!(player.plays.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stop_pauses_and_clears_caption() {
        let player = ManualPlayer::new();
        let mut engine = PreviewEngine::new(
            PlaybackWindow::new(10.0, 40.0).unwrap(),
            captions(),
            PreviewSource::Local(player.clone()),
            PreviewConfig::default(),
        );
        let mut rx = engine.subscribe_caption();

        engine.toggle();
        wait_for_caption(&mut rx, Some("a")).await;

        engine.toggle();
        assert_eq!(engine.state(), PreviewState::Stopped);
        assert_eq!(engine.active_caption(), None);
        assert_eq!(player.pauses.load(Ordering::SeqCst), 1);

        player.report(36.0);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(engine.active_caption(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_playback_follows_clock_and_loops() {
        let mut engine = PreviewEngine::new(
            PlaybackWindow::new(10.0, 40.0).unwrap(),
            captions(),
            PreviewSource::Remote("https://www.youtube.com/embed/x".into()),
            PreviewConfig::default(),
        );

        engine.play();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(engine.active_caption().as_deref(), Some("a"));

        tokio::time::sleep(Duration::from_millis(12_000)).await;
        assert_eq!(engine.active_caption().as_deref(), Some("b"));

        tokio::time::sleep(Duration::from_millis(14_000)).await;
        assert_eq!(engine.active_caption().as_deref(), Some("c"));

        // 31s elapsed: one full loop plus one second.
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(engine.active_caption().as_deref(), Some("a"));

        engine.stop();
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(engine.active_caption(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_clock_starts_when_play_is_called() {
        let mut engine = PreviewEngine::new(
            PlaybackWindow::new(10.0, 40.0).unwrap(),
            captions(),
            PreviewSource::Remote("ref".into()),
            PreviewConfig::default(),
        );

        // The tracking task has not been polled yet when the clock moves.
        engine.play();
        tokio::time::advance(Duration::from_secs(12)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(engine.active_caption().as_deref(), Some("b"));
    }

    #[test]
    fn test_publish_is_ignored_once_stopped() {
        let (caption, _) = watch::channel(None);
        let segment = CaptionSegment::new(0.0, 10.0, "a");
        let playing = AtomicBool::new(true);

        publish(&caption, &playing, Some(&segment));
        assert_eq!(caption.borrow().as_deref(), Some("a"));

        playing.store(false, Ordering::SeqCst);
        caption.send_replace(None);
        publish(&caption, &playing, Some(&segment));
        assert_eq!(*caption.borrow(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_engine_cancels_tracking() {
        let mut engine = PreviewEngine::new(
            PlaybackWindow::new(0.0, 30.0).unwrap(),
            captions(),
            PreviewSource::Remote("ref".into()),
            PreviewConfig::default(),
        );
        engine.play();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut rx = engine.subscribe_caption();
        rx.borrow_and_update();
        drop(engine);

        let closed = timeout(Duration::from_secs(60), rx.changed()).await;
        assert!(matches!(closed, Ok(Err(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_player_loops_window() {
        let player = Arc::new(ClockPlayer::new(Duration::from_millis(100)));
        let mut engine = PreviewEngine::new(
            PlaybackWindow::new(10.0, 12.0).unwrap(),
            vec![
                CaptionSegment::new(0.0, 1.0, "x"),
                CaptionSegment::new(1.0, 2.0, "y"),
            ],
            PreviewSource::Local(player.clone()),
            PreviewConfig::default(),
        );

        engine.play();
        tokio::time::sleep(Duration::from_millis(1_550)).await;
        assert_eq!(engine.active_caption().as_deref(), Some("y"));

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(engine.active_caption().as_deref(), Some("x"));
        assert!(player.position() < 12.0);
    }

    #[test]
    fn test_from_result_uses_first_highlight() {
        let mut result = PipelineResult::default();
        assert!(matches!(
            PreviewEngine::from_result(&result, PreviewSource::Remote("r".into()), PreviewConfig::default()),
            Err(PreviewError::MissingHighlight)
        ));

        result.stage_b = Some(StageBResult {
            highlights: vec![
                HighlightSegment::new(10.0, 40.0, "first"),
                HighlightSegment::new(50.0, 55.0, "second"),
            ],
            thumbnails: Vec::new(),
            product_summaries: Vec::new(),
            seo: SeoBundle {
                title: String::new(),
                description: String::new(),
                tags: Vec::new(),
                comment_text: String::new(),
                meta_keywords: Vec::new(),
                thumbnail_text: String::new(),
            },
            generated_video_url: "https://www.youtube.com/embed/x".into(),
            generated_script: String::new(),
            overlay_subtitles: captions(),
        });

        let mut no_highlight = result.clone();
        if let Some(b) = no_highlight.stage_b.as_mut() {
            b.highlights.clear();
        }
        assert!(matches!(
            PreviewEngine::from_result(&no_highlight, PreviewSource::Remote("r".into()), PreviewConfig::default()),
            Err(PreviewError::MissingHighlight)
        ));

        let source = PreviewEngine::remote_source(&result).unwrap();
        let engine = PreviewEngine::from_result(&result, source, PreviewConfig::default()).unwrap();
        assert_eq!(engine.window(), PlaybackWindow::new(10.0, 40.0).unwrap());
        assert_eq!(engine.state(), PreviewState::Stopped);
        assert_eq!(engine.captions.len(), 3);
    }
}
