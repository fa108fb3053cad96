//! Platform dispatch and upstream comment adapters
//!
//! A post URL is classified into exactly one [`PostTarget`], which carries the
//! platform-specific identifier. Each platform has its own adapter module
//! that knows the upstream query shape and how to normalize the response
//! into `Comment` records.
//!
//! ```text
//!   url ──► classify() ──► PostTarget ──► CommentSource::fetch_page()
//!                                              │
//!                     instagram / youtube / facebook adapter
//!                                              │
//!                                              ▼
//!                                         CommentPage
//! ```

pub mod facebook;
pub mod instagram;
pub mod youtube;

mod client;

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use regex::Regex;
use serde_json::Value;

use crate::comment::CommentPage;
use crate::{Error, Result};

pub use client::{RapidApiClient, UpstreamConfig};

/// Shortcode patterns, tried in order
static INSTAGRAM_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"/reel/([a-zA-Z0-9_-]+)").expect("valid regex"),
        Regex::new(r"/p/([a-zA-Z0-9_-]+)").expect("valid regex"),
        Regex::new(r"/tv/([a-zA-Z0-9_-]+)").expect("valid regex"),
    ]
});

static YOUTUBE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})(?:[?&].*)?$").expect("valid regex")
});

static FACEBOOK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"facebook\.com/(\S+)").expect("valid regex"));

/// Length of generated fallback comment ids
const FALLBACK_ID_LEN: usize = 8;

/// Supported social platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Instagram,
    YouTube,
    Facebook,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instagram => write!(f, "Instagram"),
            Self::YouTube => write!(f, "YouTube"),
            Self::Facebook => write!(f, "Facebook"),
        }
    }
}

/// A classified post, carrying the identifier its upstream API expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostTarget {
    Instagram { shortcode: String },
    YouTube { video_id: String },
    /// The Facebook scraper takes the full post link
    Facebook { link: String },
}

impl PostTarget {
    #[must_use]
    pub const fn platform(&self) -> Platform {
        match self {
            Self::Instagram { .. } => Platform::Instagram,
            Self::YouTube { .. } => Platform::YouTube,
            Self::Facebook { .. } => Platform::Facebook,
        }
    }

    /// The extracted identifier
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Instagram { shortcode } => shortcode,
            Self::YouTube { video_id } => video_id,
            Self::Facebook { link } => link,
        }
    }
}

/// Classify a post URL and extract its platform identifier
///
/// Platforms are checked in a fixed order: Instagram, YouTube, Facebook.
///
/// # Errors
///
/// Returns `MissingUrl` for a blank URL, `UnsupportedPlatform` when no
/// platform matches, and `InvalidPostUrl` when the platform matches but the
/// identifier cannot be extracted.
pub fn classify(url: &str) -> Result<PostTarget> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::MissingUrl);
    }

    if url.contains("instagram.com") {
        let shortcode = INSTAGRAM_PATTERNS
            .iter()
            .find_map(|re| re.captures(url))
            .and_then(|caps| caps.get(1))
            .ok_or(Error::InvalidPostUrl(Platform::Instagram))?;
        return Ok(PostTarget::Instagram {
            shortcode: shortcode.as_str().to_string(),
        });
    }

    if url.contains("youtube.com") || url.contains("youtu.be") {
        let video_id = YOUTUBE_PATTERN
            .captures(url)
            .and_then(|caps| caps.get(1))
            .ok_or(Error::InvalidPostUrl(Platform::YouTube))?;
        return Ok(PostTarget::YouTube {
            video_id: video_id.as_str().to_string(),
        });
    }

    if url.contains("facebook.com") {
        if !FACEBOOK_PATTERN.is_match(url) {
            return Err(Error::InvalidPostUrl(Platform::Facebook));
        }
        return Ok(PostTarget::Facebook {
            link: url.to_string(),
        });
    }

    Err(Error::UnsupportedPlatform(url.to_string()))
}

/// Source of upstream comment pages
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetch one page of comments for a post
    ///
    /// `token` is the cursor returned by the previous page, if any.
    async fn fetch_page(&self, target: &PostTarget, token: Option<&str>) -> Result<CommentPage>;
}

/// Follow a path of object keys, returning `None` at the first missing step
pub(crate) fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

/// A non-empty string at `path`; numbers are rendered as strings
pub(crate) fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    match lookup(value, path)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Array at `path`, or an empty slice when absent
pub(crate) fn items_at<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    lookup(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Random id for comments that arrive without one
pub(crate) fn fallback_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FALLBACK_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
