//! Pipeline controller.
//!
//! Owns the pipeline state machine `{Idle, Running, Completed, Error}` and
//! the step board. State lives in a `watch` channel: admission checks and
//! transitions go through `send_if_modified`, so two concurrent `start` calls
//! can never both observe a non-running pipeline.

use std::sync::Arc;

use clipstream_models::{Locale, PipelineResult, RunId, RunInput, StageId, StepView};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::ControllerError;
use crate::orchestrator::{StageRequest, StepOrchestrator};
use crate::snapshot::{PipelineSnapshot, PipelineStatus};

/// Drives stages through the orchestrator and publishes snapshots.
pub struct PipelineController {
    orchestrator: Arc<StepOrchestrator>,
    board: watch::Sender<PipelineSnapshot>,
}

impl PipelineController {
    pub fn new(orchestrator: StepOrchestrator, locale: Locale) -> Self {
        let (board, _) = watch::channel(PipelineSnapshot::initial(locale));
        Self {
            orchestrator: Arc::new(orchestrator),
            board,
        }
    }

    /// Run `stage` to completion or failure.
    ///
    /// Legal from Idle for the first stage, or from Completed for the stage
    /// that follows the last completed one.
    pub async fn start(
        &self,
        stage: StageId,
        input: &RunInput,
    ) -> Result<PipelineResult, ControllerError> {
        let mut rejection = None;
        self.board.send_if_modified(|snap| match admit(snap, stage) {
            Ok(()) => {
                snap.status = PipelineStatus::Running;
                snap.error = None;
                true
            }
            Err(e) => {
                rejection = Some(e);
                false
            }
        });
        if let Some(e) = rejection {
            warn!(stage = %stage, "Start rejected: {}", e);
            return Err(e);
        }

        let (run_id, locale, previous) = {
            let snap = self.board.borrow();
            (snap.run_id.clone(), snap.locale, snap.result.clone())
        };
        info!(run_id = %run_id, stage = %stage, "Starting stage");

        let guard = RunningGuard {
            board: &self.board,
            armed: true,
        };
        let outcome = self
            .orchestrator
            .run_stage(
                StageRequest {
                    stage,
                    input,
                    locale,
                    run_id: &run_id,
                },
                previous,
                &self.board,
            )
            .await;
        guard.disarm();

        match outcome {
            Ok(result) => {
                self.board.send_modify(|snap| {
                    snap.status = PipelineStatus::Completed;
                    snap.last_completed = Some(stage);
                    snap.result = result.clone();
                });
                Ok(result)
            }
            Err(e) => {
                let message = e.to_string();
                self.board.send_modify(|snap| {
                    snap.status = PipelineStatus::Error;
                    snap.error = Some(message);
                });
                Err(ControllerError::Pipeline(e))
            }
        }
    }

    /// Clear the result and put the first stage's steps back to Pending.
    pub fn reset(&self) -> Result<(), ControllerError> {
        let mut running = false;
        self.board.send_if_modified(|snap| {
            if snap.status == PipelineStatus::Running {
                running = true;
                return false;
            }
            *snap = PipelineSnapshot::initial(snap.locale);
            true
        });
        if running {
            return Err(ControllerError::ResetWhileRunning);
        }
        info!("Pipeline reset");
        Ok(())
    }

    /// Change the display and generation locale. Steps are not touched.
    pub fn set_locale(&self, locale: Locale) {
        self.board.send_if_modified(|snap| {
            if snap.locale == locale {
                return false;
            }
            snap.locale = locale;
            true
        });
    }

    pub fn locale(&self) -> Locale {
        self.board.borrow().locale
    }

    /// Step board projected for `locale`.
    pub fn steps(&self, locale: Locale) -> Vec<StepView> {
        self.board.borrow().views(locale)
    }

    /// Step board projected for the current locale.
    pub fn current_steps(&self) -> Vec<StepView> {
        let snap = self.board.borrow();
        snap.views(snap.locale)
    }

    pub fn status(&self) -> PipelineStatus {
        self.board.borrow().status
    }

    pub fn result(&self) -> PipelineResult {
        self.board.borrow().result.clone()
    }

    pub fn run_id(&self) -> RunId {
        self.board.borrow().run_id.clone()
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        self.board.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.board.subscribe()
    }
}

fn admit(snap: &PipelineSnapshot, stage: StageId) -> Result<(), ControllerError> {
    let allowed = match snap.status {
        PipelineStatus::Running => return Err(ControllerError::AlreadyRunning),
        PipelineStatus::Idle => stage == StageId::first(),
        PipelineStatus::Completed => {
            stage.previous().is_some() && stage.previous() == snap.last_completed
        }
        PipelineStatus::Error => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(ControllerError::StageOutOfOrder {
            stage,
            status: snap.status,
        })
    }
}

/// Marks the pipeline failed if a running stage future is dropped.
struct RunningGuard<'a> {
    board: &'a watch::Sender<PipelineSnapshot>,
    armed: bool,
}

impl RunningGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.board.send_modify(|snap| {
                snap.status = PipelineStatus::Error;
                snap.error = Some("Stage run cancelled".to_string());
            });
        }
    }
}
