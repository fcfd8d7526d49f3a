//! ClipStream command-line runner.
//!
//! Runs every stage for one source URL, streams step progress to the log and
//! prints the final result as JSON. With `CLIPSTREAM_PREVIEW_SECS` set, the
//! looping preview is played for that long afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clipstream_genai::{ContentGenerator, GeminiClient, OfflineGenerator, ResilientGenerator};
use clipstream_models::{RunInput, StageId, StepId, StepStatus};
use clipstream_pipeline::{PipelineConfig, PipelineController, PipelineSnapshot, StepOrchestrator};
use clipstream_preview::{ClockPlayer, PreviewConfig, PreviewEngine, PreviewSource};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log targets when `RUST_LOG` is unset: the binary plus every workspace crate.
const DEFAULT_LOG_FILTER: &str =
    "clipstream=info,clipstream_pipeline=info,clipstream_genai=info,clipstream_preview=info,clipstream_models=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting clipstream");

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let source_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| RunInput::default().source_url);

    let generator: Arc<dyn ContentGenerator> = match GeminiClient::from_env() {
        Ok(client) => Arc::new(ResilientGenerator::new(client)),
        Err(e) => {
            warn!("{}; using offline placeholder content", e);
            Arc::new(OfflineGenerator::new())
        }
    };

    let orchestrator = StepOrchestrator::from_config(generator, &config);
    let controller = PipelineController::new(orchestrator, config.locale);
    let progress = tokio::spawn(report_progress(controller.subscribe()));

    let input = RunInput::new(source_url);
    for stage in StageId::ALL {
        controller
            .start(stage, &input)
            .await
            .with_context(|| format!("Stage '{}' failed", stage))?;
    }
    progress.abort();

    let result = controller.result();
    println!("{}", serde_json::to_string_pretty(&result)?);

    let preview_secs: u64 = std::env::var("CLIPSTREAM_PREVIEW_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    if preview_secs > 0 {
        let preview_config = PreviewConfig::from_env();
        let source = match &result.local_media {
            Some(_) => PreviewSource::Local(Arc::new(ClockPlayer::new(preview_config.tick))),
            None => PreviewEngine::remote_source(&result)?,
        };
        let mut engine = PreviewEngine::from_result(&result, source, preview_config)?;
        let mut captions = engine.subscribe_caption();
        engine.play();

        let deadline = tokio::time::sleep(Duration::from_secs(preview_secs));
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                changed = captions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if let Some(text) = captions.borrow_and_update().clone() {
                        println!("[caption] {}", text);
                    }
                }
            }
        }
        engine.stop();
    }

    info!("clipstream finished");
    Ok(())
}

/// Log step transitions as the board changes.
async fn report_progress(mut board: watch::Receiver<PipelineSnapshot>) {
    let mut seen: HashMap<StepId, (StepStatus, usize)> = HashMap::new();
    loop {
        {
            let snap = board.borrow_and_update();
            for view in snap.views(snap.locale) {
                let (last_status, logged) = seen.get(&view.id).copied().unwrap_or_default();
                for line in view.logs.iter().skip(logged) {
                    info!(step = %view.id, "{}: {}", view.label, line);
                }
                if view.status != last_status {
                    info!(step = %view.id, status = %view.status, "{}", view.label);
                }
                seen.insert(view.id, (view.status, view.logs.len()));
            }
        }
        if board.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_workspace_crates() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        for target in [
            "clipstream=",
            "clipstream_pipeline=",
            "clipstream_genai=",
            "clipstream_preview=",
            "clipstream_models=",
        ] {
            assert!(DEFAULT_LOG_FILTER.contains(target), "missing {}", target);
        }
    }
}
