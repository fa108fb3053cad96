//! Analyze pipeline: classify, fetch, clean, score, merge
//!
//! One call to [`Analyzer::analyze`] makes exactly one upstream request and
//! at most one scorer run. Failures anywhere discard the whole batch; there
//! are no partial results.

use std::collections::HashSet;
use std::sync::Arc;

use crate::comment::{self, AnalysisResult, ScoredComment};
use crate::platform::{self, CommentSource};
use crate::scoring::ToxicityScorer;
use crate::Result;

/// Runs the comment ingestion pipeline against a source and a scorer
#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn CommentSource>,
    scorer: Arc<dyn ToxicityScorer>,
}

impl Analyzer {
    #[must_use]
    pub fn new(source: Arc<dyn CommentSource>, scorer: Arc<dyn ToxicityScorer>) -> Self {
        Self { source, scorer }
    }

    /// Analyze one page of comments for a post URL
    ///
    /// # Errors
    ///
    /// Returns a client error for unusable URLs, `Fetch` for upstream failures
    /// and `Scoring`/`ScoreMismatch` when the classifier output is unusable.
    pub async fn analyze(&self, url: &str, token: Option<&str>) -> Result<AnalysisResult> {
        let target = platform::classify(url)?;
        let token = token.filter(|t| !t.is_empty());

        let page = self.source.fetch_page(&target, token).await?;
        if page.comments.is_empty() {
            tracing::info!(platform = %target.platform(), "no comments returned, skipping scorer");
            return Ok(AnalysisResult::empty(page.next_token));
        }

        let comments = comment::clean(page.comments);
        let texts: Vec<String> = comments.iter().map(|c| c.text.clone()).collect();

        let scores = self.scorer.score(&texts).await?;
        let comments = scores.attach(comments)?;

        tracing::info!(
            platform = %target.platform(),
            count = comments.len(),
            avg_toxicity = scores.avg_toxicity,
            "analysis complete"
        );

        Ok(AnalysisResult {
            comments,
            avg_toxicity: scores.avg_toxicity,
            next_token: page.next_token,
        })
    }

    /// Fetch the page at the feed's frontier and merge it in
    ///
    /// An exhausted feed is returned untouched without contacting upstream.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Analyzer::analyze`]; the feed is left
    /// unchanged in that case.
    pub async fn load_more(&self, feed: &mut CommentFeed) -> Result<MergeOutcome> {
        let Some(token) = feed.next_token.clone() else {
            return Ok(MergeOutcome {
                added: 0,
                exhausted: true,
            });
        };

        let page = self.analyze(&feed.url, Some(&token)).await?;
        Ok(feed.absorb(page))
    }
}

/// What happened when a page was merged into a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Comments that were not already present
    pub added: usize,
    /// No further pages exist upstream
    pub exhausted: bool,
}

/// Accumulated comments for one post across "load more" pages
#[derive(Debug, Clone)]
pub struct CommentFeed {
    pub url: String,
    pub comments: Vec<ScoredComment>,
    pub next_token: Option<String>,
}

impl CommentFeed {
    /// Start a feed from the first analyzed page
    #[must_use]
    pub fn new(url: impl Into<String>, first: AnalysisResult) -> Self {
        let mut feed = Self {
            url: url.into(),
            comments: Vec::new(),
            next_token: None,
        };
        feed.absorb(first);
        feed
    }

    /// Merge a freshly analyzed page, skipping ids already in the feed
    ///
    /// The page's token always becomes the new frontier. When every comment
    /// in the page is a duplicate the accumulated list is left unchanged.
    pub fn absorb(&mut self, page: AnalysisResult) -> MergeOutcome {
        let mut seen: HashSet<String> = self.comments.iter().map(|c| c.id.clone()).collect();
        let fresh: Vec<ScoredComment> = page
            .comments
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();

        let added = fresh.len();
        if added == 0 {
            tracing::debug!(url = %self.url, "page contained no new comments");
        }
        self.comments.extend(fresh);
        self.next_token = page.next_token.filter(|t| !t.is_empty());

        MergeOutcome {
            added,
            exhausted: self.next_token.is_none(),
        }
    }

    /// Mean toxicity over every accumulated comment
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_toxicity(&self) -> f64 {
        if self.comments.is_empty() {
            return 0.0;
        }
        self.comments.iter().map(|c| c.toxicity).sum::<f64>() / self.comments.len() as f64
    }
}
