//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use clipstream_models::Locale;

/// Pipeline configuration.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Display and generation locale
    pub locale: Locale,
    /// Pause used by steps that stand in for real media work
    pub step_delay: Duration,
    /// Directory for acquired media
    pub work_dir: PathBuf,
    /// Sample media fetched when no local file is supplied
    pub sample_url: Option<String>,
    /// Opaque access token for the identity service
    pub access_token: Option<String>,
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("locale", &self.locale)
            .field("step_delay", &self.step_delay)
            .field("work_dir", &self.work_dir)
            .field("sample_url", &self.sample_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            step_delay: Duration::from_millis(500),
            work_dir: PathBuf::from("/tmp/clipstream"),
            sample_url: None,
            access_token: None,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            locale: std::env::var("CLIPSTREAM_LOCALE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            step_delay: Duration::from_millis(
                std::env::var("CLIPSTREAM_STEP_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            work_dir: std::env::var("CLIPSTREAM_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/clipstream")),
            sample_url: std::env::var("CLIPSTREAM_SAMPLE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            access_token: std::env::var("CLIPSTREAM_ACCESS_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.locale, Locale::Ko);
        assert_eq!(config.step_delay, Duration::from_millis(500));
        assert!(config.access_token.is_none());
        assert!(config.sample_url.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = PipelineConfig {
            access_token: Some("mock_token_abcdef".into()),
            ..PipelineConfig::default()
        };
        assert!(!format!("{:?}", config).contains("mock_token_abcdef"));
    }
}
