//! Preview configuration.

use std::time::Duration;

/// Preview engine configuration.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Poll interval for opaque (remote) players
    pub tick: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
        }
    }
}

impl PreviewConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            tick: Duration::from_millis(
                std::env::var("CLIPSTREAM_PREVIEW_TICK_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|ms: &u64| *ms > 0)
                    .unwrap_or(100),
            ),
        }
    }
}
