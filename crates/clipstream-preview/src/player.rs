//! Playback capability for directly controllable media.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::task::ScheduledTask;

/// Media the preview engine can seek, play and pause, and which reports its
/// playhead position (seconds into the source).
pub trait PlaybackHandle: Send + Sync + 'static {
    fn position(&self) -> f64;
    fn seek(&self, position: f64);
    fn play(&self);
    fn pause(&self);
    /// Position notifications; a new value is published at least on every
    /// seek and periodically while playing.
    fn subscribe_position(&self) -> watch::Receiver<f64>;
}

#[derive(Debug)]
struct Clock {
    playing: bool,
    anchor_position: f64,
    anchor_at: Instant,
}

impl Clock {
    fn position(&self) -> f64 {
        if self.playing {
            self.anchor_position + self.anchor_at.elapsed().as_secs_f64()
        } else {
            self.anchor_position
        }
    }
}

/// Wall-clock driven player for local buffers with no decoder behind them.
///
/// Must be created inside a Tokio runtime: a ticker task publishes the
/// position every `tick` while playing.
pub struct ClockPlayer {
    clock: Arc<Mutex<Clock>>,
    positions: Arc<watch::Sender<f64>>,
    _ticker: ScheduledTask,
}

impl ClockPlayer {
    pub fn new(tick: Duration) -> Self {
        let clock = Arc::new(Mutex::new(Clock {
            playing: false,
            anchor_position: 0.0,
            anchor_at: Instant::now(),
        }));
        let (tx, _) = watch::channel(0.0);
        let positions = Arc::new(tx);

        let ticker = {
            let clock = clock.clone();
            let positions = positions.clone();
            ScheduledTask::spawn(async move {
                let mut interval = tokio::time::interval(tick);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    let current = {
                        let clock = lock(&clock);
                        clock.playing.then(|| clock.position())
                    };
                    if let Some(position) = current {
                        positions.send_replace(position);
                    }
                }
            })
        };

        Self {
            clock,
            positions,
            _ticker: ticker,
        }
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.clock).playing
    }
}

fn lock(clock: &Mutex<Clock>) -> MutexGuard<'_, Clock> {
    clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PlaybackHandle for ClockPlayer {
    fn position(&self) -> f64 {
        lock(&self.clock).position()
    }

    fn seek(&self, position: f64) {
        {
            let mut clock = lock(&self.clock);
            clock.anchor_position = position;
            clock.anchor_at = Instant::now();
        }
        self.positions.send_replace(position);
    }

    fn play(&self) {
        let mut clock = lock(&self.clock);
        if !clock.playing {
            clock.anchor_at = Instant::now();
            clock.playing = true;
        }
    }

    fn pause(&self) {
        let mut clock = lock(&self.clock);
        if clock.playing {
            clock.anchor_position = clock.position();
            clock.playing = false;
        }
    }

    fn subscribe_position(&self) -> watch::Receiver<f64> {
        self.positions.subscribe()
    }
}
