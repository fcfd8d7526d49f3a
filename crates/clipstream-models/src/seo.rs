//! SEO bundle produced for the short.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Titles, tags and companion text for publishing the short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeoBundle {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Pinned comment text
    #[serde(default)]
    pub comment_text: String,
    #[serde(default)]
    pub meta_keywords: Vec<String>,
    /// Short overlay text for the thumbnail (max 3 words)
    #[serde(default)]
    pub thumbnail_text: String,
}

impl SeoBundle {
    /// Tags rendered as hashtags, e.g. `#shorts #viral`.
    pub fn hashtags(&self) -> String {
        self.tags
            .iter()
            .map(|t| t.trim().trim_start_matches('#'))
            .filter(|t| !t.is_empty())
            .map(|t| format!("#{}", t.replace(' ', "")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashtags() {
        let seo = SeoBundle {
            title: "t".into(),
            description: "d".into(),
            tags: vec!["shorts".into(), "#viral".into(), " tech news ".into(), "".into()],
            comment_text: String::new(),
            meta_keywords: vec![],
            thumbnail_text: "WOW".into(),
        };
        assert_eq!(seo.hashtags(), "#shorts #viral #technews");
    }

    #[test]
    fn test_seo_wire_names() {
        let json = r#"{"title":"a","description":"b","tags":[],"commentText":"c",
            "metaKeywords":["k"],"thumbnailText":"T"}"#;
        let seo: SeoBundle = serde_json::from_str(json).unwrap();
        assert_eq!(seo.comment_text, "c");
        assert_eq!(seo.meta_keywords, vec!["k".to_string()]);
    }
}
