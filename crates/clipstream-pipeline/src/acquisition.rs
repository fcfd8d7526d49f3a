//! Media acquisition.
//!
//! Fetches a media file into the work directory so the run can proceed with
//! a local buffer. Progress is advisory: it is reported with `try_send` and
//! dropped when nobody keeps up.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clipstream_models::{youtube_id_or, MediaHandle};
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Progress updates, in percent (0..=100).
pub type ProgressSender = mpsc::Sender<u8>;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Media server returned {0}")]
    Status(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for AcquisitionError {
    fn from(e: reqwest::Error) -> Self {
        AcquisitionError::Request(e.to_string())
    }
}

/// Produces a local media handle for a source.
#[async_trait]
pub trait MediaAcquirer: Send + Sync {
    async fn acquire(
        &self,
        source_url: &str,
        progress: Option<ProgressSender>,
    ) -> Result<MediaHandle, AcquisitionError>;
}

/// Streams a fixed sample file over HTTP into the work directory.
pub struct HttpSampleAcquirer {
    client: Client,
    sample_url: String,
    work_dir: PathBuf,
}

impl HttpSampleAcquirer {
    pub fn new(sample_url: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            sample_url: sample_url.into(),
            work_dir: work_dir.into(),
        }
    }
}

fn report(progress: &Option<ProgressSender>, percent: u8) {
    if let Some(tx) = progress {
        let _ = tx.try_send(percent);
    }
}

#[async_trait]
impl MediaAcquirer for HttpSampleAcquirer {
    async fn acquire(
        &self,
        source_url: &str,
        progress: Option<ProgressSender>,
    ) -> Result<MediaHandle, AcquisitionError> {
        let video_id = youtube_id_or(source_url, "video");
        tokio::fs::create_dir_all(&self.work_dir).await?;
        let path = self.work_dir.join(format!("YouTube_Source_{}.mp4", video_id));

        info!("Fetching sample media from {}", self.sample_url);
        report(&progress, 0);

        let response = self.client.get(&self.sample_url).send().await?;
        if !response.status().is_success() {
            return Err(AcquisitionError::Status(response.status().as_u16()));
        }

        let total = response.content_length().filter(|t| *t > 0);
        let downloaded = stream_to_file(response.bytes_stream(), &path, total, &progress).await?;
        report(&progress, 100);

        debug!(path = %path.display(), bytes = downloaded, "Sample media stored");
        Ok(MediaHandle::new(path, downloaded))
    }
}

/// Write `stream` to `path`, removing the partial file if anything fails.
async fn stream_to_file<S, B, E>(
    stream: S,
    path: &Path,
    total: Option<u64>,
    progress: &Option<ProgressSender>,
) -> Result<u64, AcquisitionError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<AcquisitionError>,
{
    match write_chunks(stream, path, total, progress).await {
        Ok(written) => Ok(written),
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(path).await {
                debug!(path = %path.display(), "Partial media not removed: {}", remove_err);
            }
            Err(e)
        }
    }
}

async fn write_chunks<S, B, E>(
    mut stream: S,
    path: &Path,
    total: Option<u64>,
    progress: &Option<ProgressSender>,
) -> Result<u64, AcquisitionError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<AcquisitionError>,
{
    let mut file = tokio::fs::File::create(path).await?;
    let mut downloaded: u64 = 0;
    let mut last_percent = 0u8;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::into)?;
        let bytes = chunk.as_ref();
        file.write_all(bytes).await?;
        downloaded += bytes.len() as u64;

        if let Some(total) = total {
            let percent = (downloaded.saturating_mul(100) / total).min(99) as u8;
            if percent > last_percent {
                last_percent = percent;
                report(progress, percent);
            }
        }
    }
    file.flush().await?;
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_acquire_streams_into_work_dir() {
        let server = MockServer::start().await;
        let body = vec![7u8; 256 * 1024];
        Mock::given(method("GET"))
            .and(path("/sample.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let acquirer = HttpSampleAcquirer::new(format!("{}/sample.mp4", server.uri()), dir.path());
        let (tx, mut rx) = mpsc::channel(256);

        let handle = acquirer
            .acquire("https://www.youtube.com/watch?v=jfKfPfyJRdk", Some(tx))
            .await
            .unwrap();

        assert_eq!(handle.file_name, "YouTube_Source_jfKfPfyJRdk.mp4");
        assert_eq!(handle.size_bytes, body.len() as u64);
        let written = tokio::fs::read(&handle.path).await.unwrap();
        assert_eq!(written.len(), body.len());

        let mut updates = Vec::new();
        while let Ok(p) = rx.try_recv() {
            updates.push(p);
        }
        assert_eq!(updates.first(), Some(&0));
        assert_eq!(updates.last(), Some(&100));
        assert!(updates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_acquire_without_progress_listener() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 10]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let acquirer = HttpSampleAcquirer::new(server.uri(), dir.path());
        let handle = acquirer.acquire("not a url", None).await.unwrap();
        assert_eq!(handle.file_name, "YouTube_Source_video.mp4");
    }

    #[tokio::test]
    async fn test_interrupted_stream_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("YouTube_Source_jfKfPfyJRdk.mp4");
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(vec![1u8; 1024]),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];

        let err = stream_to_file(futures_util::stream::iter(chunks), &path, Some(4096), &None)
            .await
            .unwrap_err();

        assert!(matches!(err, AcquisitionError::Io(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_complete_stream_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![Ok(vec![1u8; 10]), Ok(vec![2u8; 6])];

        let written = stream_to_file(futures_util::stream::iter(chunks), &path, None, &None)
            .await
            .unwrap();

        assert_eq!(written, 16);
        assert_eq!(tokio::fs::read(&path).await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_acquire_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let acquirer = HttpSampleAcquirer::new(server.uri(), dir.path());
        let err = acquirer.acquire("https://youtu.be/jfKfPfyJRdk", None).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Status(404)));
    }
}
