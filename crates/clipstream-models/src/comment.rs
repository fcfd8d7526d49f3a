//! Viewer comments handled by the engagement stage.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tone of a viewer comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    /// Also absorbs labels the generator invents ("question", "mixed").
    #[default]
    #[serde(other)]
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A viewer comment and the reply drafted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    #[serde(default)]
    pub avatar: String,
    pub text: String,
    /// Relative age, e.g. "3h ago"
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default)]
    pub is_replied: bool,
}

impl Comment {
    pub fn new(id: impl Into<String>, author: impl Into<String>, text: impl Into<String>) -> Self {
        let author = author.into();
        Self {
            id: id.into(),
            avatar: avatar_for(&author),
            author,
            text: text.into(),
            timestamp: String::new(),
            likes: 0,
            sentiment: Sentiment::Neutral,
            reply: None,
            is_replied: false,
        }
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = sentiment;
        self
    }

    /// A reply was drafted but not yet posted.
    pub fn awaiting_post(&self) -> bool {
        self.reply.is_some() && !self.is_replied
    }
}

/// Generated avatar URL for a comment author.
pub fn avatar_for(author: &str) -> String {
    format!("https://api.dicebear.com/9.x/avataaars/svg?seed={}", author)
}

/// Counts reported after reply posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct AutoReplyStats {
    pub total: u32,
    pub replied: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sentiment_is_neutral() {
        let s: Sentiment = serde_json::from_str("\"question\"").unwrap();
        assert_eq!(s, Sentiment::Neutral);
    }

    #[test]
    fn test_sentiment_wire_names() {
        for (sentiment, wire) in [
            (Sentiment::Positive, "\"positive\""),
            (Sentiment::Negative, "\"negative\""),
            (Sentiment::Neutral, "\"neutral\""),
        ] {
            assert_eq!(serde_json::to_string(&sentiment).unwrap(), wire);
            assert_eq!(serde_json::from_str::<Sentiment>(wire).unwrap(), sentiment);
        }

        let comment: Comment = serde_json::from_str(
            r#"{"id":"cm_0","author":"kim","text":"hi","sentiment":"mixed"}"#,
        )
        .unwrap();
        assert_eq!(comment.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_awaiting_post() {
        let mut c = Comment::new("cm_0", "Ann", "Great video");
        assert!(!c.awaiting_post());
        c.reply = Some("Thanks!".into());
        assert!(c.awaiting_post());
        c.is_replied = true;
        assert!(!c.awaiting_post());
        assert!(c.avatar.ends_with("seed=Ann"));
    }
}
