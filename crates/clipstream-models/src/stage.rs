//! Stage definition table.
//!
//! Static mapping from stage to its ordered step ids, plus the locale label
//! table for every step. Nothing here is mutated at runtime.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::step::StepId;

/// One ordered phase of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Stage A: source validation, metadata, transcript.
    Analysis,
    /// Stage B: highlight, cut, captions, SEO.
    Rendering,
    /// Stage C: comment harvesting and replies.
    Engagement,
}

const ANALYSIS_STEPS: &[StepId] = &[
    StepId::Source,
    StepId::Metadata,
    StepId::Buffer,
    StepId::Audio,
    StepId::Transcript,
    StepId::Context,
];

const RENDERING_STEPS: &[StepId] = &[
    StepId::Highlight,
    StepId::SmartCut,
    StepId::Captioning,
    StepId::SoundMix,
    StepId::Thumbnail,
    StepId::Seo,
    StepId::Render,
];

const ENGAGEMENT_STEPS: &[StepId] = &[StepId::Comments, StepId::ReplyDraft, StepId::ReplyPost];

impl StageId {
    /// All stages in execution order.
    pub const ALL: [StageId; 3] = [StageId::Analysis, StageId::Rendering, StageId::Engagement];

    /// The stage every run begins with.
    pub fn first() -> Self {
        StageId::Analysis
    }

    /// Ordered step ids; this order is the execution order.
    pub fn steps(&self) -> &'static [StepId] {
        match self {
            StageId::Analysis => ANALYSIS_STEPS,
            StageId::Rendering => RENDERING_STEPS,
            StageId::Engagement => ENGAGEMENT_STEPS,
        }
    }

    /// The stage that must be completed before this one may start.
    pub fn previous(&self) -> Option<StageId> {
        match self {
            StageId::Analysis => None,
            StageId::Rendering => Some(StageId::Analysis),
            StageId::Engagement => Some(StageId::Rendering),
        }
    }

    pub fn next(&self) -> Option<StageId> {
        match self {
            StageId::Analysis => Some(StageId::Rendering),
            StageId::Rendering => Some(StageId::Engagement),
            StageId::Engagement => None,
        }
    }

    /// Stage owning a step.
    pub fn of_step(step: StepId) -> StageId {
        Self::ALL
            .into_iter()
            .find(|stage| stage.steps().contains(&step))
            .unwrap_or(StageId::Analysis)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Analysis => "analysis",
            StageId::Rendering => "rendering",
            StageId::Engagement => "engagement",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolve `(label, description)` for a step in a locale.
pub fn step_label(step: StepId, locale: Locale) -> (&'static str, &'static str) {
    match (step, locale) {
        (StepId::Source, Locale::En) => ("Analyzing Source", "Validating video format and access."),
        (StepId::Source, Locale::Ko) => ("소스 분석", "영상 포맷과 접근 권한을 확인합니다."),
        (StepId::Metadata, Locale::En) => ("Metadata Scan", "Extracting contextual information."),
        (StepId::Metadata, Locale::Ko) => ("메타데이터 스캔", "영상의 문맥 정보를 추출합니다."),
        (StepId::Buffer, Locale::En) => ("Video Processing", "Preparing video buffer for editing."),
        (StepId::Buffer, Locale::Ko) => ("비디오 처리", "편집을 위해 비디오 버퍼를 준비합니다."),
        (StepId::Audio, Locale::En) => ("Audio Separation", "Isolating vocal tracks."),
        (StepId::Audio, Locale::Ko) => ("오디오 분리", "보컬 트랙을 분리합니다."),
        (StepId::Transcript, Locale::En) => ("AI Transcription", "Converting speech to text."),
        (StepId::Transcript, Locale::Ko) => ("AI 자막 생성", "음성을 텍스트로 변환합니다."),
        (StepId::Context, Locale::En) => ("Context Analysis", "Understanding video content."),
        (StepId::Context, Locale::Ko) => ("문맥 분석", "영상 내용을 심층 분석합니다."),
        (StepId::Highlight, Locale::En) => ("Highlight Detection", "Finding the most viral moment."),
        (StepId::Highlight, Locale::Ko) => ("하이라이트 감지", "가장 바이럴한 순간을 찾아냅니다."),
        (StepId::SmartCut, Locale::En) => ("Smart Cut", "Trimming video to vertical format."),
        (StepId::SmartCut, Locale::Ko) => ("스마트 컷", "세로 화면으로 영상을 트리밍합니다."),
        (StepId::Captioning, Locale::En) => ("Captioning", "Applying dynamic subtitles."),
        (StepId::Captioning, Locale::Ko) => ("자막 입히기", "다이내믹 자막 효과를 적용합니다."),
        (StepId::SoundMix, Locale::En) => ("Sound Engineering", "Mixing voice and background."),
        (StepId::SoundMix, Locale::Ko) => ("사운드 믹싱", "음성과 배경음을 조절합니다."),
        (StepId::Thumbnail, Locale::En) => ("Visual Polish", "Generating thumbnails."),
        (StepId::Thumbnail, Locale::Ko) => ("비주얼 작업", "썸네일을 생성합니다."),
        (StepId::Seo, Locale::En) => ("Viral SEO", "Writing optimized titles/tags."),
        (StepId::Seo, Locale::Ko) => ("바이럴 SEO", "최적화된 제목과 태그를 작성합니다."),
        (StepId::Render, Locale::En) => ("Final Rendering", "Packaging final output."),
        (StepId::Render, Locale::Ko) => ("최종 렌더링", "결과물을 패키징합니다."),
        (StepId::Comments, Locale::En) => ("Comment Harvest", "Collecting recent viewer comments."),
        (StepId::Comments, Locale::Ko) => ("댓글 수집", "최근 시청자 댓글을 수집합니다."),
        (StepId::ReplyDraft, Locale::En) => ("Reply Drafting", "Writing replies with AI."),
        (StepId::ReplyDraft, Locale::Ko) => ("답글 작성", "AI로 답글을 작성합니다."),
        (StepId::ReplyPost, Locale::En) => ("Reply Posting", "Publishing replies to the channel."),
        (StepId::ReplyPost, Locale::Ko) => ("답글 게시", "채널에 답글을 게시합니다."),
    }
}
