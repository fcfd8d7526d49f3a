//! Pipeline step vocabulary and lifecycle.
//!
//! A step is the smallest trackable unit of work in a stage. The canonical
//! record ([`StepState`]) carries only identity, status and logs; display
//! strings are attached by projecting it into a [`StepView`] for a locale.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::stage::step_label;

/// Stable identifier of a pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    // Analysis
    Source,
    Metadata,
    Buffer,
    Audio,
    Transcript,
    Context,
    // Rendering
    Highlight,
    SmartCut,
    Captioning,
    SoundMix,
    Thumbnail,
    Seo,
    Render,
    // Engagement
    Comments,
    ReplyDraft,
    ReplyPost,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Source => "source",
            StepId::Metadata => "metadata",
            StepId::Buffer => "buffer",
            StepId::Audio => "audio",
            StepId::Transcript => "transcript",
            StepId::Context => "context",
            StepId::Highlight => "highlight",
            StepId::SmartCut => "smart_cut",
            StepId::Captioning => "captioning",
            StepId::SoundMix => "sound_mix",
            StepId::Thumbnail => "thumbnail",
            StepId::Seo => "seo",
            StepId::Render => "render",
            StepId::Comments => "comments",
            StepId::ReplyDraft => "reply_draft",
            StepId::ReplyPost => "reply_post",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Error,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Active => "active",
            StepStatus::Completed => "completed",
            StepStatus::Error => "error",
        }
    }

    /// Check if this is a terminal state (no more transitions this run).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Error)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical state of one step within a stage run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepState {
    pub id: StepId,
    pub status: StepStatus,
    /// Append-only log lines, in insertion order.
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepState {
    /// Create a fresh pending step.
    pub fn pending(id: StepId) -> Self {
        Self {
            id,
            status: StepStatus::Pending,
            logs: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Pending → Active. Returns false if the step was not pending.
    pub fn activate(&mut self) -> bool {
        if self.status != StepStatus::Pending {
            return false;
        }
        self.status = StepStatus::Active;
        self.started_at = Some(Utc::now());
        true
    }

    /// Active → Completed. Returns false if the step was not active.
    pub fn complete(&mut self) -> bool {
        if self.status != StepStatus::Active {
            return false;
        }
        self.status = StepStatus::Completed;
        self.finished_at = Some(Utc::now());
        true
    }

    /// Active → Error, recording the failure message as the final log line.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.status != StepStatus::Active {
            return false;
        }
        self.status = StepStatus::Error;
        self.logs.push(message.into());
        self.finished_at = Some(Utc::now());
        true
    }

    /// Append a log line.
    pub fn log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    /// Project this step into a display view for `locale`.
    pub fn view(&self, locale: Locale) -> StepView {
        let (label, description) = step_label(self.id, locale);
        StepView {
            id: self.id,
            label: label.to_string(),
            description: description.to_string(),
            status: self.status,
            logs: self.logs.clone(),
        }
    }
}

/// Read-only display projection of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StepView {
    pub id: StepId,
    pub label: String,
    pub description: String,
    pub status: StepStatus,
    pub logs: Vec<String>,
}
