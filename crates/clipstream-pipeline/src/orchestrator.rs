//! Step orchestrator.
//!
//! Runs the steps of one stage strictly in declared order. Every status
//! change and log line goes through the controller's `watch` channel, and the
//! partially built result is republished after each step so work done before
//! a failure stays inspectable.

use std::sync::Arc;
use std::time::Duration;

use clipstream_genai::{ContentGenerator, HighlightRequest};
use clipstream_models::{
    chunk_script, embed_reference, extract_youtube_id, AutoReplyStats, HighlightSegment, Locale,
    MediaHandle, PipelineResult, RunId, RunInput, StageCResult, StageId, StepId, VideoMetadata,
    VIRTUAL_SOURCE_PATH,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, Instrument};

use crate::acquisition::{HttpSampleAcquirer, MediaAcquirer};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, StepError, StepResult};
use crate::identity::{
    token_preview, ReplyPublisher, SimulatedPublisher, StaticToken, TokenProvider,
    YoutubeReplyPublisher, YOUTUBE_API_BASE,
};
use crate::logging::RunLogger;
use crate::snapshot::PipelineSnapshot;

/// Parameters of one stage run.
#[derive(Debug, Clone, Copy)]
pub struct StageRequest<'a> {
    pub stage: StageId,
    pub input: &'a RunInput,
    pub locale: Locale,
    pub run_id: &'a RunId,
}

/// Sequences the steps of a stage against the external collaborators.
pub struct StepOrchestrator {
    generator: Arc<dyn ContentGenerator>,
    tokens: Arc<dyn TokenProvider>,
    publisher: Arc<dyn ReplyPublisher>,
    acquirer: Option<Arc<dyn MediaAcquirer>>,
    step_delay: Duration,
}

impl StepOrchestrator {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            generator,
            tokens: Arc::new(StaticToken::none()),
            publisher: Arc::new(SimulatedPublisher::default()),
            acquirer: None,
            step_delay: Duration::from_millis(500),
        }
    }

    /// Wire collaborators from configuration.
    pub fn from_config(generator: Arc<dyn ContentGenerator>, config: &PipelineConfig) -> Self {
        let publisher = YoutubeReplyPublisher::new(
            YOUTUBE_API_BASE,
            SimulatedPublisher::new(config.step_delay),
        );
        let mut orchestrator = Self::new(generator)
            .with_tokens(Arc::new(StaticToken::from_option(config.access_token.clone())))
            .with_publisher(Arc::new(publisher))
            .with_step_delay(config.step_delay);
        if let Some(url) = &config.sample_url {
            orchestrator = orchestrator
                .with_acquirer(Arc::new(HttpSampleAcquirer::new(url, &config.work_dir)));
        }
        orchestrator
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn ReplyPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_acquirer(mut self, acquirer: Arc<dyn MediaAcquirer>) -> Self {
        self.acquirer = Some(acquirer);
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Run every step of `request.stage`, starting from `previous`.
    ///
    /// Returns the updated result, or the failure of the first step that
    /// errored; later steps are left Pending.
    pub async fn run_stage(
        &self,
        request: StageRequest<'_>,
        previous: PipelineResult,
        board: &watch::Sender<PipelineSnapshot>,
    ) -> Result<PipelineResult, PipelineError> {
        let stage = request.stage;
        let tracker = StepTracker {
            board,
            logger: RunLogger::new(request.run_id, stage),
        };
        let span = tracker.logger.create_span();

        async {
            tracker.logger.log_start(&request.input.source_url);
            tracker.begin_stage(stage);

            let mut result = prepare_result(stage, previous);
            tracker.publish(&result);

            for &step in stage.steps() {
                tracker.activate(step);
                let log = StepLog {
                    tracker: &tracker,
                    step,
                };

                match self.run_step(step, &request, &log, &mut result).await {
                    Ok(()) => {
                        tracker.complete(step);
                        tracker.publish(&result);
                    }
                    Err(e) => {
                        let message = e.to_string();
                        tracker.logger.log_error(step, &message);
                        tracker.fail(step, message);
                        tracker.publish(&result);
                        return Err(PipelineError::StepFailed {
                            stage,
                            step,
                            source: e,
                        });
                    }
                }
            }

            tracker
                .logger
                .log_completion(&format!("{} steps", stage.steps().len()));
            Ok(result)
        }
        .instrument(span)
        .await
    }

    async fn run_step(
        &self,
        step: StepId,
        request: &StageRequest<'_>,
        log: &StepLog<'_>,
        result: &mut PipelineResult,
    ) -> StepResult<()> {
        let input = request.input;
        let locale = request.locale;

        match step {
            // Analysis
            StepId::Source => self.check_source(input, log).await,
            StepId::Metadata => {
                let metadata = self
                    .generator
                    .describe_source(&input.source_url, locale)
                    .await?;
                log.line(format!("ID: {} | Title: {}", metadata.id, metadata.title));
                result.metadata = Some(metadata);
                Ok(())
            }
            StepId::Buffer => {
                result.local_media = self.prepare_buffer(input, log).await?;
                Ok(())
            }
            StepId::Audio => {
                log.line("Extracting audio track...");
                self.pause().await;
                Ok(())
            }
            StepId::Transcript => {
                let title = require_metadata(result)?.title.clone();
                let transcript = self.generator.transcribe(&title, locale).await?;
                if transcript.is_empty() {
                    return Err(StepError::unusable("transcript is empty"));
                }
                log.line(format!("Transcript ready ({} lines)", transcript.len()));
                result.transcript = transcript;
                Ok(())
            }
            StepId::Context => {
                result.video_path = result
                    .local_media
                    .as_ref()
                    .map(|m| m.file_name.clone())
                    .unwrap_or_else(|| VIRTUAL_SOURCE_PATH.to_string());
                log.line(format!("Source path: {}", result.video_path));
                Ok(())
            }

            // Rendering
            StepId::Highlight => self.select_highlight(request, log, result).await,
            StepId::SmartCut => {
                let video_id = require_metadata(result)?.id.clone();
                let highlight = require_highlight(result)?.clone();
                if result.has_local_media() {
                    log.line("Processing Local Video Buffer...");
                    log.line(format!(
                        "Applying Cut: {:.1}s to {:.1}s",
                        highlight.start, highlight.end
                    ));
                } else {
                    log.line("Accessing Cloud Storage...");
                    log.line(format!(
                        "Slicing video frame: {} to {}...",
                        highlight.start, highlight.end
                    ));
                }
                self.pause().await;
                result.draft.preview_reference = Some(embed_reference(&video_id, &highlight));
                Ok(())
            }
            StepId::Captioning => {
                let highlight = require_highlight(result)?.clone();
                log.line("Analyzing visual context...");
                let script = self
                    .generator
                    .write_narration(&highlight, &result.transcript, &input.voice_style, locale)
                    .await?;
                log.line(format!("Script generated ({} chars)", script.chars().count()));
                log.line(format!("Caption style: {}", input.title_style));
                result.draft.overlay_captions = chunk_script(&script, highlight.duration());
                result.draft.script = Some(script);
                Ok(())
            }
            StepId::SoundMix => {
                log.line("Synthesizing Neural Audio...");
                log.line("Mixing audio tracks...");
                self.pause().await;
                Ok(())
            }
            StepId::Thumbnail => {
                let metadata = require_metadata(result)?;
                let thumbnail = self.generator.render_thumbnail(metadata).await?;
                result.draft.thumbnail = Some(thumbnail);
                Ok(())
            }
            StepId::Seo => {
                let metadata = require_metadata(result)?;
                let script = result.draft.script.clone().unwrap_or_default();
                let seo = self
                    .generator
                    .build_seo(metadata, &script, &input.clip_style, locale)
                    .await?;
                log.line(format!("SEO title: {}", seo.title));
                result.draft.seo = Some(seo);
                Ok(())
            }
            StepId::Render => {
                log.line("Finalizing build...");
                let mut bundle = result.draft.finish().map_err(|missing| {
                    StepError::missing_input(format!("rendering draft has no {}", missing))
                })?;
                bundle.product_summaries = input.shopping_link_list();
                if !bundle.product_summaries.is_empty() {
                    log.line(format!(
                        "Attached {} product links",
                        bundle.product_summaries.len()
                    ));
                }
                result.stage_b = Some(bundle);
                Ok(())
            }

            // Engagement
            StepId::Comments => {
                let title = require_metadata(result)?.title.clone();
                let comments = self.generator.collect_comments(&title, locale).await?;
                log.line(format!("Collected {} comments", comments.len()));
                result.stage_c = Some(StageCResult {
                    auto_reply_stats: AutoReplyStats {
                        total: comments.len() as u32,
                        replied: 0,
                    },
                    comments,
                });
                Ok(())
            }
            StepId::ReplyDraft => self.draft_replies(locale, log, result).await,
            StepId::ReplyPost => self.post_replies(log, result).await,
        }
    }

    async fn check_source(&self, input: &RunInput, log: &StepLog<'_>) -> StepResult<()> {
        self.pause().await;
        let url = input.source_url.trim();
        extract_youtube_id(url)
            .map_err(|e| StepError::validation(format!("Invalid URL: {} ({})", url, e)))?;

        if let Some(token) = self.tokens.access_token().await {
            log.line(format!(
                "Authenticated Request (Bearer {}...)",
                token_preview(&token)
            ));
        }
        log.line(format!("Valid URL: {}", url));
        Ok(())
    }

    async fn prepare_buffer(
        &self,
        input: &RunInput,
        log: &StepLog<'_>,
    ) -> StepResult<Option<MediaHandle>> {
        let media = match (&input.local_media, &self.acquirer) {
            (Some(media), _) => Some(media.clone()),
            (None, Some(acquirer)) => {
                log.line("Fetching sample media...");
                Some(self.acquire(acquirer.as_ref(), &input.source_url).await?)
            }
            (None, None) => None,
        };

        match media {
            Some(media) => {
                log.line("Source Verification: Local File Detected.");
                log.line(format!("File: {} ({:.2}MB)", media.file_name, media.size_mb()));
                self.pause().await;
                log.line("Input stream active: Ready for processing.");
                Ok(Some(media))
            }
            None => {
                log.line("No local file. Initiating cloud stream...");
                log.line("Virtual source acquired.");
                Ok(None)
            }
        }
    }

    async fn acquire(&self, acquirer: &dyn MediaAcquirer, source_url: &str) -> StepResult<MediaHandle> {
        let (tx, mut rx) = mpsc::channel(16);
        let watcher = tokio::spawn(async move {
            while let Some(percent) = rx.recv().await {
                debug!(percent, "Acquisition progress");
            }
        });
        let media = acquirer.acquire(source_url, Some(tx)).await;
        watcher.abort();
        Ok(media?)
    }

    async fn select_highlight(
        &self,
        request: &StageRequest<'_>,
        log: &StepLog<'_>,
        result: &mut PipelineResult,
    ) -> StepResult<()> {
        if result.transcript.is_empty() {
            return Err(StepError::missing_input("transcript from the analysis stage"));
        }
        log.line("Analyzing engagement metrics...");

        let highlights = self
            .generator
            .select_highlight(
                &result.transcript,
                HighlightRequest {
                    target_length: &request.input.clip_length,
                    style: &request.input.clip_style,
                },
                request.locale,
            )
            .await?;

        let mut highlights = highlights.into_iter();
        let primary = highlights
            .next()
            .ok_or_else(|| StepError::unusable("no highlight segment returned"))?;
        primary
            .validate()
            .map_err(|e| StepError::unusable(e.to_string()))?;

        let extra = highlights.count();
        if extra > 0 {
            log.warn(&format!("Ignoring {} additional highlight segments", extra));
        }

        log.line(format!(
            "Target Segment: {}s - {}s",
            primary.start, primary.end
        ));
        result.draft.highlights = vec![primary];
        Ok(())
    }

    async fn draft_replies(
        &self,
        locale: Locale,
        log: &StepLog<'_>,
        result: &mut PipelineResult,
    ) -> StepResult<()> {
        let engagement = result
            .stage_c
            .as_mut()
            .ok_or_else(|| StepError::missing_input("collected comments"))?;

        let mut drafted = 0;
        for comment in engagement.comments.iter_mut().filter(|c| c.reply.is_none()) {
            let reply = self
                .generator
                .draft_reply(&comment.text, comment.sentiment, locale)
                .await?;
            comment.reply = Some(reply);
            drafted += 1;
        }
        log.line(format!("Drafted {} replies", drafted));
        Ok(())
    }

    async fn post_replies(&self, log: &StepLog<'_>, result: &mut PipelineResult) -> StepResult<()> {
        let engagement = result
            .stage_c
            .as_mut()
            .ok_or_else(|| StepError::missing_input("collected comments"))?;

        let Some(token) = self.tokens.access_token().await else {
            log.line("No access token. Skipping reply posting.");
            return Ok(());
        };

        for comment in engagement.comments.iter_mut().filter(|c| c.awaiting_post()) {
            let Some(reply) = comment.reply.as_deref() else {
                continue;
            };
            if self.publisher.post_reply(&token, &comment.id, reply).await? {
                comment.is_replied = true;
                log.line(format!("Reply posted: {}", comment.id));
            } else {
                log.warn(&format!("Reply rejected: {}", comment.id));
            }
        }

        let replied = engagement.comments.iter().filter(|c| c.is_replied).count() as u32;
        engagement.auto_reply_stats = AutoReplyStats {
            total: engagement.comments.len() as u32,
            replied,
        };
        log.line(format!("Replies posted: {}/{}", replied, engagement.comments.len()));
        Ok(())
    }

    async fn pause(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }
}

/// Reset the parts of the result the stage is about to produce.
fn prepare_result(stage: StageId, previous: PipelineResult) -> PipelineResult {
    match stage {
        StageId::Analysis => PipelineResult::default(),
        StageId::Rendering => PipelineResult {
            draft: Default::default(),
            stage_b: None,
            stage_c: None,
            ..previous
        },
        StageId::Engagement => PipelineResult {
            stage_c: None,
            ..previous
        },
    }
}

fn require_metadata(result: &PipelineResult) -> StepResult<&VideoMetadata> {
    result
        .metadata
        .as_ref()
        .ok_or_else(|| StepError::missing_input("video metadata from the analysis stage"))
}

fn require_highlight(result: &PipelineResult) -> StepResult<&HighlightSegment> {
    result
        .draft
        .highlights
        .first()
        .ok_or_else(|| StepError::missing_input("highlight segment"))
}

/// Applies step transitions to the shared board.
struct StepTracker<'a> {
    board: &'a watch::Sender<PipelineSnapshot>,
    logger: RunLogger,
}

impl StepTracker<'_> {
    fn begin_stage(&self, stage: StageId) {
        self.board.send_modify(|snap| snap.begin_stage(stage));
    }

    fn activate(&self, step: StepId) {
        self.board.send_modify(|snap| {
            if let Some(state) = snap.step_mut(step) {
                state.activate();
            }
        });
    }

    fn log(&self, step: StepId, line: String) {
        self.logger.log_progress(step, &line);
        self.board.send_modify(|snap| {
            if let Some(state) = snap.step_mut(step) {
                state.log(line);
            }
        });
    }

    fn complete(&self, step: StepId) {
        self.board.send_modify(|snap| {
            if let Some(state) = snap.step_mut(step) {
                state.complete();
            }
        });
    }

    fn fail(&self, step: StepId, message: String) {
        self.board.send_modify(|snap| {
            if let Some(state) = snap.step_mut(step) {
                state.fail(message);
            }
        });
    }

    fn publish(&self, result: &PipelineResult) {
        self.board.send_modify(|snap| snap.result = result.clone());
    }
}

/// Log sink bound to the active step.
struct StepLog<'a> {
    tracker: &'a StepTracker<'a>,
    step: StepId,
}

impl StepLog<'_> {
    fn line(&self, line: impl Into<String>) {
        self.tracker.log(self.step, line.into());
    }

    /// Record a warning both on the board and in the trace output.
    fn warn(&self, message: &str) {
        self.tracker.logger.log_warning(self.step, message);
        self.tracker.board.send_modify(|snap| {
            if let Some(state) = snap.step_mut(self.step) {
                state.log(message);
            }
        });
    }
}
