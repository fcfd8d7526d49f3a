//! ClipStream pipeline.
//!
//! This crate provides:
//! - The step orchestrator that runs one stage against the collaborators
//! - The pipeline controller state machine and its observable snapshots
//! - Identity, reply publishing and media acquisition collaborators
//! - Configuration and structured run logging

pub mod acquisition;
pub mod config;
pub mod controller;
pub mod error;
pub mod identity;
pub mod logging;
pub mod orchestrator;
pub mod snapshot;

pub use acquisition::{AcquisitionError, HttpSampleAcquirer, MediaAcquirer};
pub use config::PipelineConfig;
pub use controller::PipelineController;
pub use error::{ControllerError, PipelineError, StepError, StepResult};
pub use identity::{
    PublishError, ReplyPublisher, SimulatedPublisher, StaticToken, TokenProvider,
    YoutubeReplyPublisher,
};
pub use logging::RunLogger;
pub use orchestrator::{StageRequest, StepOrchestrator};
pub use snapshot::{PipelineSnapshot, PipelineStatus};
