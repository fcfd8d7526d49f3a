//! Structured run logging utilities.
//!
//! Provides consistent, structured logging for stage runs with tracing spans
//! and contextual information (run id, stage).

use clipstream_models::{RunId, StageId, StepId};
use tracing::{error, info, warn, Span};

/// Run logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    stage: StageId,
}

impl RunLogger {
    /// Create a new logger for a run and stage.
    pub fn new(run_id: &RunId, stage: StageId) -> Self {
        Self {
            run_id: run_id.to_string(),
            stage,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            "Stage started: {}", message
        );
    }

    /// Log a progress update for a step.
    pub fn log_progress(&self, step: StepId, message: &str) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            step = %step,
            "Stage progress: {}", message
        );
    }

    pub fn log_warning(&self, step: StepId, message: &str) {
        warn!(
            run_id = %self.run_id,
            stage = %self.stage,
            step = %step,
            "Stage warning: {}", message
        );
    }

    pub fn log_error(&self, step: StepId, message: &str) {
        error!(
            run_id = %self.run_id,
            stage = %self.stage,
            step = %step,
            "Stage error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            stage = %self.stage,
            "Stage completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn stage(&self) -> StageId {
        self.stage
    }

    /// Create a tracing span for this stage run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "stage_run",
            run_id = %self.run_id,
            stage = %self.stage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, StageId::Rendering);

        assert_eq!(logger.run_id(), run_id.to_string());
        assert_eq!(logger.stage(), StageId::Rendering);
    }
}
