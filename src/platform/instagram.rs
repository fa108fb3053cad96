//! Instagram comments adapter

use serde_json::Value;

use super::{fallback_id, items_at, text_at};
use crate::comment::{Comment, CommentPage, UNKNOWN_USER};

/// Default upstream endpoint
pub const DEFAULT_ENDPOINT: &str = "https://instagram-social.p.rapidapi.com/api/v1/instagram/comments";

/// Query parameters for one page
#[must_use]
pub fn query(shortcode: &str, token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![("code", shortcode.to_string())];
    if let Some(token) = token {
        params.push(("pagination_token", token.to_string()));
    }
    params
}

/// Normalize an upstream response
///
/// Comments live under `body`, the cursor under `meta.pagination_token`.
#[must_use]
pub fn parse_page(payload: &Value) -> CommentPage {
    let comments = items_at(payload, &["body"])
        .iter()
        .map(|c| Comment {
            id: text_at(c, &["pk"]).unwrap_or_else(fallback_id),
            username: text_at(c, &["user", "username"]).unwrap_or_else(|| UNKNOWN_USER.to_string()),
            text: text_at(c, &["text"]).unwrap_or_default(),
        })
        .collect();

    CommentPage {
        comments,
        next_token: text_at(payload, &["meta", "pagination_token"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_with_and_without_token() {
        assert_eq!(query("ABC", None), vec![("code", "ABC".to_string())]);
        assert_eq!(
            query("ABC", Some("tok")),
            vec![
                ("code", "ABC".to_string()),
                ("pagination_token", "tok".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_page() {
        let payload = json!({
            "body": [
                {"pk": 17_900_000_001_u64, "text": "nice reel", "user": {"username": "alice"}},
                {"pk": "17900000002", "text": "meh", "user": {}},
            ],
            "meta": {"pagination_token": "QVFE"}
        });

        let page = parse_page(&payload);
        assert_eq!(page.comments.len(), 2);
        assert_eq!(page.comments[0].id, "17900000001");
        assert_eq!(page.comments[0].username, "alice");
        assert_eq!(page.comments[1].id, "17900000002");
        assert_eq!(page.comments[1].username, UNKNOWN_USER);
        assert_eq!(page.next_token.as_deref(), Some("QVFE"));
    }

    #[test]
    fn test_parse_page_missing_fields() {
        let page = parse_page(&json!({"body": [{}], "meta": {"pagination_token": ""}}));
        assert_eq!(page.comments.len(), 1);
        assert!(!page.comments[0].id.is_empty());
        assert_eq!(page.comments[0].username, UNKNOWN_USER);
        assert_eq!(page.comments[0].text, "");
        assert!(page.next_token.is_none());

        let page = parse_page(&json!({"status": "ok"}));
        assert!(page.comments.is_empty());
        assert!(page.next_token.is_none());
    }
}
