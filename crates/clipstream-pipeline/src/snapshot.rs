//! Observable pipeline state.

use std::fmt;

use clipstream_models::{Locale, PipelineResult, RunId, StageId, StepId, StepState, StepView};
use serde::{Deserialize, Serialize};

/// Controller lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Idle => "idle",
            PipelineStatus::Running => "running",
            PipelineStatus::Completed => "completed",
            PipelineStatus::Error => "error",
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only view of the pipeline published to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub run_id: RunId,
    pub status: PipelineStatus,
    /// Stage most recently started
    pub stage: StageId,
    /// Stage most recently completed successfully
    pub last_completed: Option<StageId>,
    pub locale: Locale,
    /// Step board: every step of every stage started so far, in order
    pub steps: Vec<StepState>,
    pub result: PipelineResult,
    /// Failure message of the last run, if it failed
    pub error: Option<String>,
}

impl PipelineSnapshot {
    /// Fresh state: first stage pending, empty result.
    pub fn initial(locale: Locale) -> Self {
        let stage = StageId::first();
        Self {
            run_id: RunId::new(),
            status: PipelineStatus::Idle,
            stage,
            last_completed: None,
            locale,
            steps: stage.steps().iter().copied().map(StepState::pending).collect(),
            result: PipelineResult::default(),
            error: None,
        }
    }

    pub fn step(&self, id: StepId) -> Option<&StepState> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub(crate) fn step_mut(&mut self, id: StepId) -> Option<&mut StepState> {
        self.steps.iter_mut().find(|s| s.id == id)
    }

    /// Project the board for a locale. Status and logs are left untouched.
    pub fn views(&self, locale: Locale) -> Vec<StepView> {
        self.steps.iter().map(|s| s.view(locale)).collect()
    }

    /// Replace the steps of `stage` with fresh pending ones, keeping earlier
    /// stages on the board and dropping later ones.
    pub(crate) fn begin_stage(&mut self, stage: StageId) {
        self.steps.retain(|s| StageId::of_step(s.id) < stage);
        self.steps
            .extend(stage.steps().iter().copied().map(StepState::pending));
        self.stage = stage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstream_models::StepStatus;

    #[test]
    fn test_initial_board() {
        let snap = PipelineSnapshot::initial(Locale::En);
        assert_eq!(snap.status, PipelineStatus::Idle);
        assert_eq!(snap.steps.len(), StageId::Analysis.steps().len());
        assert!(snap
            .steps
            .iter()
            .all(|s| s.status == StepStatus::Pending && s.logs.is_empty()));
    }

    #[test]
    fn test_begin_stage_keeps_earlier_stages() {
        let mut snap = PipelineSnapshot::initial(Locale::En);
        snap.step_mut(StepId::Source).unwrap().activate();
        snap.step_mut(StepId::Source).unwrap().log("Valid URL");

        snap.begin_stage(StageId::Rendering);
        assert_eq!(snap.steps.len(), 6 + 7);
        assert_eq!(snap.step(StepId::Source).unwrap().logs, vec!["Valid URL"]);

        snap.step_mut(StepId::Highlight).unwrap().activate();
        snap.begin_stage(StageId::Rendering);
        assert_eq!(snap.steps.len(), 6 + 7);
        assert_eq!(
            snap.step(StepId::Highlight).unwrap().status,
            StepStatus::Pending
        );
    }
}
