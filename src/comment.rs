//! Normalized comment records and text cleanup

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Username used when an upstream comment carries no author
pub const UNKNOWN_USER: &str = "unknown_user";

/// Dingbats, private-use area and the pictograph planes the dashboard cannot render
static EMOJI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{2700}-\u{27BF}\u{E000}-\u{F8FF}\u{1F000}-\u{1F7FF}\u{1F900}-\u{1F9FF}]")
        .expect("valid regex")
});

/// A comment normalized from any upstream platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub username: String,
    pub text: String,
}

/// A comment with its toxicity score attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredComment {
    pub id: String,
    pub username: String,
    pub text: String,
    pub toxicity: f64,
}

impl ScoredComment {
    #[must_use]
    pub fn new(comment: Comment, toxicity: f64) -> Self {
        Self {
            id: comment.id,
            username: comment.username,
            text: comment.text,
            toxicity,
        }
    }
}

/// One page of comments from an upstream API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    /// Opaque cursor for the next page; `None` when exhausted
    pub next_token: Option<String>,
}

/// Complete response of one analyze call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub comments: Vec<ScoredComment>,
    pub avg_toxicity: f64,
    pub next_token: Option<String>,
}

impl AnalysisResult {
    /// Result for a page with no comments; the scorer is never consulted
    #[must_use]
    pub const fn empty(next_token: Option<String>) -> Self {
        Self {
            comments: Vec::new(),
            avg_toxicity: 0.0,
            next_token,
        }
    }
}

/// Remove emoji and pictographic symbols, then trim
#[must_use]
pub fn strip_emoji(text: &str) -> String {
    EMOJI_REGEX.replace_all(text, "").trim().to_string()
}

/// Apply [`strip_emoji`] to every comment text
#[must_use]
pub fn clean(comments: Vec<Comment>) -> Vec<Comment> {
    comments
        .into_iter()
        .map(|c| Comment {
            text: strip_emoji(&c.text),
            ..c
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_emoji_removes_pictographs() {
        assert_eq!(strip_emoji("great video 🔥🔥"), "great video");
        assert_eq!(strip_emoji("😀 hello 🤖 world"), "hello  world");
        assert_eq!(strip_emoji("check ✔ done ✨"), "check  done");
    }

    #[test]
    fn test_strip_emoji_keeps_plain_text() {
        assert_eq!(strip_emoji("  plain text  "), "plain text");
        assert_eq!(strip_emoji("ünïcödé and 漢字"), "ünïcödé and 漢字");
    }

    #[test]
    fn test_strip_emoji_is_idempotent() {
        let inputs = ["wow 🎉 nice", "🙏", "  spaced ✂ out  ", "no emoji"];
        for input in inputs {
            let once = strip_emoji(input);
            assert_eq!(strip_emoji(&once), once);
        }
    }

    #[test]
    fn test_clean_keeps_ids_and_usernames() {
        let cleaned = clean(vec![Comment {
            id: "c1".to_string(),
            username: "alice".to_string(),
            text: "lol 😂".to_string(),
        }]);
        assert_eq!(cleaned[0].id, "c1");
        assert_eq!(cleaned[0].username, "alice");
        assert_eq!(cleaned[0].text, "lol");
    }

    #[test]
    fn test_analysis_result_serializes_camel_case() {
        let json = serde_json::to_value(AnalysisResult::empty(None)).unwrap();
        assert_eq!(json["avgToxicity"], 0.0);
        assert!(json["nextToken"].is_null());
        assert!(json["comments"].as_array().unwrap().is_empty());
    }
}
