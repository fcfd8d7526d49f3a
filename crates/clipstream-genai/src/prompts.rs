//! Prompt templates for the Gemini client.

use clipstream_models::{CaptionItem, HighlightSegment, Locale, Sentiment, EARLY_WINDOW_SECS};

use crate::generator::HighlightRequest;

pub fn metadata_prompt(video_id: &str, locale: Locale) -> String {
    format!(
        r#"You are a metadata extractor for YouTube videos.
Produce metadata for the video with ID: {video_id}.
Assume the video exists. If you do not know it, invent a plausible title,
description and channel name that fit current tech/viral trends.
Write all text in {language}.

Return ONLY a single JSON object with this schema:
{{
  "id": "{video_id}",
  "title": "Video title",
  "description": "Short description",
  "duration": "MM:SS",
  "channelTitle": "Channel name",
  "viewCount": "12345"
}}"#,
        language = locale.language_name(),
    )
}

pub fn transcript_prompt(title: &str, locale: Locale) -> String {
    format!(
        r#"Write a plausible subtitle transcript for a video titled "{title}".
Produce 15 to 20 lines of dialogue or monologue in {language}.

Return ONLY a JSON array of objects: {{"start": seconds, "end": seconds, "text": "line"}}.
Timestamps are numbers in seconds, ascending, non-overlapping."#,
        language = locale.language_name(),
    )
}

pub fn highlight_prompt(
    transcript: &[CaptionItem],
    request: HighlightRequest<'_>,
    locale: Locale,
) -> String {
    let transcript_json = serde_json::to_string(transcript).unwrap_or_default();
    format!(
        r#"Analyze these subtitles and find ONE contiguous segment suitable for a {length} viral short.
The start time MUST be within the first {window} seconds of the video.
Style: {style}.
Write the reason in {language}.

SUBTITLES:
{transcript_json}

Return ONLY a JSON array with exactly 1 item: {{"start": seconds, "end": seconds, "reason": "why"}}."#,
        length = request.target_length,
        window = EARLY_WINDOW_SECS,
        style = request.style,
        language = locale.language_name(),
    )
}

pub fn narration_prompt(
    highlight: &HighlightSegment,
    transcript: &[CaptionItem],
    style: &str,
    locale: Locale,
) -> String {
    let segment_text = transcript
        .iter()
        .filter(|line| line.within(highlight.start, highlight.end))
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        r#"Transcript segment: "{segment_text}"
Reason it was selected: "{reason}"

Write a short, engaging narrator script (at most 3 sentences) that reacts to this clip.
Style: {style}.
Language: {language}.
Output only the text to be spoken."#,
        reason = highlight.reason,
        language = locale.language_name(),
    )
}

pub fn seo_prompt(title: &str, script: &str, style: &str, locale: Locale) -> String {
    format!(
        r#"Generate YouTube Shorts metadata for a clip with this narration: "{script}".
Original title: "{title}".
Style: {style}.
Language: {language}.

Return ONLY a single JSON object with this schema:
{{
  "title": "Clip title",
  "description": "Clip description",
  "tags": ["tag"],
  "commentText": "Pinned comment",
  "metaKeywords": ["keyword"],
  "thumbnailText": "Max three words"
}}"#,
        language = locale.language_name(),
    )
}

pub fn comments_prompt(title: &str, locale: Locale) -> String {
    format!(
        r#"Generate 5 YouTube viewer comments for a video titled "{title}".
Mix positive, neutral and question-style comments.
Language: {language}.

Return ONLY a JSON array of objects:
{{"author": "name", "text": "comment", "likes": 0, "sentiment": "positive|neutral|negative"}}"#,
        language = locale.language_name(),
    )
}

pub fn reply_prompt(comment_text: &str, sentiment: Sentiment, locale: Locale) -> String {
    format!(
        r#"You are a friendly YouTube creator. Write a short, engaging reply to this viewer comment: "{comment_text}".
Comment sentiment: {sentiment}.
Language: {language}.
Keep it to one sentence and add an emoji. Output only the reply."#,
        sentiment = sentiment.as_str(),
        language = locale.language_name(),
    )
}
