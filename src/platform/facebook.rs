//! Facebook comments adapter
//!
//! The scraper has no pagination: every response is a single, final page.

use serde_json::Value;

use super::{fallback_id, items_at, text_at};
use crate::comment::{Comment, CommentPage, UNKNOWN_USER};

/// Default upstream endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://facebook-scraper-api4.p.rapidapi.com/get_facebook_post_comments_details";

/// Query parameters; the scraper takes the whole post link
#[must_use]
pub fn query(link: &str) -> Vec<(&'static str, String)> {
    vec![("link", link.to_string())]
}

/// Normalize an upstream response
///
/// Comments live under `data.comments`. The page never carries a cursor.
#[must_use]
pub fn parse_page(payload: &Value) -> CommentPage {
    let comments = items_at(payload, &["data", "comments"])
        .iter()
        .map(|c| Comment {
            id: text_at(c, &["comment_id"])
                .or_else(|| text_at(c, &["id"]))
                .unwrap_or_else(fallback_id),
            text: text_at(c, &["comment_text"])
                .or_else(|| text_at(c, &["text"]))
                .unwrap_or_default(),
            username: text_at(c, &["author", "name"])
                .or_else(|| text_at(c, &["user_name"]))
                .unwrap_or_else(|| UNKNOWN_USER.to_string()),
        })
        .collect();

    CommentPage {
        comments,
        next_token: None,
    }
}
