//! Summary statistics over scored comments

use serde::Serialize;

use crate::comment::ScoredComment;

/// Score above which a comment counts as toxic
pub const TOXIC_THRESHOLD: f64 = 0.6;

/// Number of equal-width histogram buckets over [0, 1]
pub const HISTOGRAM_BUCKETS: usize = 5;

/// Toxicity breakdown for a set of comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToxicitySummary {
    pub total: usize,
    pub toxic: usize,
    pub clean: usize,
    /// Comment counts per 20% toxicity band
    pub histogram: [usize; HISTOGRAM_BUCKETS],
}

impl ToxicitySummary {
    #[must_use]
    pub fn from_comments(comments: &[ScoredComment]) -> Self {
        let mut histogram = [0; HISTOGRAM_BUCKETS];
        for c in comments {
            histogram[bucket(c.toxicity)] += 1;
        }

        let toxic = comments
            .iter()
            .filter(|c| c.toxicity > TOXIC_THRESHOLD)
            .count();

        Self {
            total: comments.len(),
            toxic,
            clean: comments.len() - toxic,
            histogram,
        }
    }

    /// Label for a histogram bucket, e.g. `20-40%`
    #[must_use]
    pub fn bucket_label(index: usize) -> String {
        let width = 100 / HISTOGRAM_BUCKETS;
        format!("{}-{}%", index * width, (index + 1) * width)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bucket(toxicity: f64) -> usize {
    let t = if toxicity.is_nan() { 0.0 } else { toxicity.clamp(0.0, 1.0) };
    ((t * HISTOGRAM_BUCKETS as f64).floor() as usize).min(HISTOGRAM_BUCKETS - 1)
}

/// Comment length bands used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    /// 1 to 20 characters
    Short,
    /// 21 to 80 characters
    Medium,
    /// More than 80 characters
    Long,
}

impl LengthClass {
    /// Classify a text by character count; empty text has no class
    #[must_use]
    pub fn of(text: &str) -> Option<Self> {
        match text.chars().count() {
            0 => None,
            1..=20 => Some(Self::Short),
            21..=80 => Some(Self::Medium),
            _ => Some(Self::Long),
        }
    }
}
