//! Pipeline error types.

use clipstream_genai::GenAiError;
use clipstream_models::{StageId, StepId};
use thiserror::Error;

use crate::acquisition::AcquisitionError;
use crate::identity::PublishError;
use crate::snapshot::PipelineStatus;

pub type StepResult<T> = Result<T, StepError>;

/// Failure of a single step. The display string becomes the step's final
/// log line.
#[derive(Debug, Error)]
pub enum StepError {
    /// Malformed input rejected before any collaborator call.
    #[error("{0}")]
    Validation(String),

    /// Generation failed or produced unusable data.
    #[error("Generation failed: {0}")]
    Collaborator(#[from] GenAiError),

    #[error("Media acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("Reply publishing failed: {0}")]
    Publish(#[from] PublishError),

    /// Data an earlier stage should have produced is absent.
    #[error("Missing input: {0}")]
    MissingInput(String),
}

impl StepError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    /// Collaborator answered, but the answer violates a constraint.
    pub fn unusable(msg: impl Into<String>) -> Self {
        Self::Collaborator(GenAiError::invalid_response(msg))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StepError::Validation(_))
    }

    pub fn is_collaborator(&self) -> bool {
        matches!(self, StepError::Collaborator(_))
    }
}

/// Failure of a stage run, attributed to the step that was active.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Step '{step}' of stage '{stage}' failed: {source}")]
    StepFailed {
        stage: StageId,
        step: StepId,
        source: StepError,
    },
}

impl PipelineError {
    pub fn step(&self) -> StepId {
        match self {
            PipelineError::StepFailed { step, .. } => *step,
        }
    }

    pub fn step_error(&self) -> &StepError {
        match self {
            PipelineError::StepFailed { source, .. } => source,
        }
    }
}

/// Rejected controller commands and failed runs.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("A stage is already running")]
    AlreadyRunning,

    #[error("Cannot reset while a stage is running")]
    ResetWhileRunning,

    #[error("Stage '{stage}' cannot start while the pipeline is {status}")]
    StageOutOfOrder {
        stage: StageId,
        status: PipelineStatus,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ControllerError {
    /// Command was refused without running anything.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ControllerError::Pipeline(_))
    }
}
