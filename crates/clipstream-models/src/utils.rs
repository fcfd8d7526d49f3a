//! Source URL parsing and validation.
//!
//! Source references are untrusted input: only YouTube hosts are accepted and
//! video ids are strictly validated (11 chars, alphanumeric plus `-_`).

use url::Url;

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum YoutubeIdError {
    #[error("URL is not a valid YouTube URL")]
    InvalidYoutubeUrl,
    #[error("Video ID has invalid format")]
    InvalidVideoId,
    #[error("Video ID not found in URL")]
    VideoIdNotFound,
}

pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];

/// Extract the video id from a YouTube URL.
///
/// Supports `watch?v=`, `youtu.be/`, `/embed/`, `/v/`, `/shorts/` and
/// `/live/` forms, with or without query parameters and fragments.
pub fn extract_youtube_id(raw: &str) -> YoutubeIdResult<String> {
    let url = parse_youtube_url(raw)?;
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

    if let Some((_, id)) = url.query_pairs().find(|(k, _)| k == "v") {
        return validate_youtube_id(&id);
    }

    let mut segments = url.path_segments().into_iter().flatten().filter(|s| !s.is_empty());
    let candidate = if host.ends_with("youtu.be") {
        segments.next()
    } else {
        match segments.next() {
            Some("embed" | "v" | "shorts" | "live") => segments.next(),
            _ => None,
        }
    };

    match candidate {
        Some(id) => validate_youtube_id(id),
        None => Err(YoutubeIdError::VideoIdNotFound),
    }
}

/// Like [`extract_youtube_id`], falling back to `fallback` on any error.
pub fn youtube_id_or(raw: &str, fallback: &str) -> String {
    extract_youtube_id(raw).unwrap_or_else(|_| fallback.to_string())
}

fn parse_youtube_url(raw: &str) -> YoutubeIdResult<Url> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).map_err(|_| YoutubeIdError::InvalidYoutubeUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(YoutubeIdError::InvalidYoutubeUrl);
    }

    let host = url
        .host_str()
        .ok_or(YoutubeIdError::InvalidYoutubeUrl)?
        .to_ascii_lowercase();
    let known = YOUTUBE_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{}", h)));
    if !known {
        return Err(YoutubeIdError::InvalidYoutubeUrl);
    }
    Ok(url)
}

fn validate_youtube_id(id: &str) -> YoutubeIdResult<String> {
    let id = id.trim();
    if id.len() != 11 {
        return Err(YoutubeIdError::InvalidVideoId);
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(YoutubeIdError::InvalidVideoId);
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_youtube_id_success_cases() {
        let cases = [
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=30",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/v/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?si=abc",
            "  https://YOUTUBE.COM/watch?v=dQw4w9WgXcQ  ",
            "youtube.com/watch?v=dQw4w9WgXcQ",
        ];
        for case in cases {
            assert_eq!(extract_youtube_id(case).unwrap(), "dQw4w9WgXcQ", "{}", case);
        }
    }

    #[test]
    fn test_extract_youtube_id_error_cases() {
        assert_eq!(
            extract_youtube_id("not-a-video-link"),
            Err(YoutubeIdError::InvalidYoutubeUrl)
        );
        assert_eq!(
            extract_youtube_id("https://vimeo.com/123"),
            Err(YoutubeIdError::InvalidYoutubeUrl)
        );
        assert_eq!(
            extract_youtube_id("https://notyoutube.com/watch?v=dQw4w9WgXcQ"),
            Err(YoutubeIdError::InvalidYoutubeUrl)
        );
        assert_eq!(
            extract_youtube_id("ftp://youtube.com/watch?v=dQw4w9WgXcQ"),
            Err(YoutubeIdError::InvalidYoutubeUrl)
        );
        assert_eq!(
            extract_youtube_id("https://youtube.com"),
            Err(YoutubeIdError::VideoIdNotFound)
        );
        assert_eq!(
            extract_youtube_id("https://youtu.be/"),
            Err(YoutubeIdError::VideoIdNotFound)
        );
        assert_eq!(
            extract_youtube_id("https://youtube.com/watch?v=abc123"),
            Err(YoutubeIdError::InvalidVideoId)
        );
        assert_eq!(
            extract_youtube_id("https://youtube.com/watch?v=abc123def!!"),
            Err(YoutubeIdError::InvalidVideoId)
        );
    }

    #[test]
    fn test_youtube_id_or_fallback() {
        assert_eq!(youtube_id_or("garbage", "dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(
            youtube_id_or("https://youtu.be/jfKfPfyJRdk", "dQw4w9WgXcQ"),
            "jfKfPfyJRdk"
        );
    }
}
