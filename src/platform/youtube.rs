//! YouTube comments adapter

use serde_json::Value;

use super::{fallback_id, items_at, text_at};
use crate::comment::{Comment, CommentPage, UNKNOWN_USER};

/// Default upstream endpoint
pub const DEFAULT_ENDPOINT: &str = "https://yt-api.p.rapidapi.com/comments";

/// Query parameters for one page
#[must_use]
pub fn query(video_id: &str, token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![("id", video_id.to_string())];
    if let Some(token) = token {
        params.push(("token", token.to_string()));
    }
    params
}

/// Normalize an upstream response
///
/// Comments live under `data`, the cursor under `continuation`.
#[must_use]
pub fn parse_page(payload: &Value) -> CommentPage {
    let comments = items_at(payload, &["data"])
        .iter()
        .map(|item| Comment {
            id: text_at(item, &["commentId"]).unwrap_or_else(fallback_id),
            username: text_at(item, &["authorText"]).unwrap_or_else(|| UNKNOWN_USER.to_string()),
            text: text_at(item, &["textDisplay"]).unwrap_or_default(),
        })
        .collect();

    CommentPage {
        comments,
        next_token: text_at(payload, &["continuation"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_uses_token_param() {
        assert_eq!(
            query("dQw4w9WgXcQ", Some("EhYSC")),
            vec![
                ("id", "dQw4w9WgXcQ".to_string()),
                ("token", "EhYSC".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_page() {
        let payload = json!({
            "commentsCount": "2",
            "data": [
                {"commentId": "UgzA", "authorText": "@bob", "textDisplay": "first 🎉"},
                {"textDisplay": "anonymous"},
            ],
            "continuation": "EhYSC2RRdzR"
        });

        let page = parse_page(&payload);
        assert_eq!(page.comments.len(), 2);
        assert_eq!(page.comments[0].id, "UgzA");
        assert_eq!(page.comments[0].username, "@bob");
        // emoji are stripped later in the pipeline, not by the adapter
        assert_eq!(page.comments[0].text, "first 🎉");
        assert_eq!(page.comments[1].username, UNKNOWN_USER);
        assert!(!page.comments[1].id.is_empty());
        assert_eq!(page.next_token.as_deref(), Some("EhYSC2RRdzR"));
    }

    #[test]
    fn test_parse_page_without_continuation() {
        let page = parse_page(&json!({"data": []}));
        assert!(page.comments.is_empty());
        assert!(page.next_token.is_none());
    }
}
