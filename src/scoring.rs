//! Toxicity scoring bridge
//!
//! Comment texts are sent to an external classifier process as one JSON
//! document on stdin; the process answers with one JSON document on stdout:
//!
//! ```text
//! stdin:  {"comments": ["first", "second"]}
//! stdout: {"scores": [0.02, 0.91], "avgToxicity": 0.465}
//! ```
//!
//! The process is spawned fresh for every batch.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::comment::{Comment, ScoredComment};
use crate::{Error, Result};

/// Default classifier command
pub const DEFAULT_PROGRAM: &str = "python3";

/// Default classifier script, relative to the working directory
pub const DEFAULT_SCRIPT: &str = "ml/toxicity_model.py";

/// Scores returned by a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToxicityScores {
    pub scores: Vec<f64>,
    pub avg_toxicity: f64,
}

impl ToxicityScores {
    /// Attach scores to comments by position
    ///
    /// # Errors
    ///
    /// Returns `ScoreMismatch` if the score count differs from the comment count
    pub fn attach(&self, comments: Vec<Comment>) -> Result<Vec<ScoredComment>> {
        if self.scores.len() != comments.len() {
            return Err(Error::ScoreMismatch {
                expected: comments.len(),
                got: self.scores.len(),
            });
        }

        Ok(comments
            .into_iter()
            .zip(self.scores.iter().copied())
            .map(|(comment, score)| ScoredComment::new(comment, score))
            .collect())
    }
}

/// Something that can score a batch of comment texts
#[async_trait]
pub trait ToxicityScorer: Send + Sync {
    /// Score every text, in order
    async fn score(&self, texts: &[String]) -> Result<ToxicityScores>;
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    comments: &'a [String],
}

/// Scorer backed by an external process speaking JSON over stdio
#[derive(Debug, Clone)]
pub struct ProcessScorer {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl Default for ProcessScorer {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, vec![DEFAULT_SCRIPT.to_string()])
    }
}

impl ProcessScorer {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Parse a whitespace-separated command line such as `python3 ml/model.py`
    ///
    /// Returns `None` for a blank command.
    #[must_use]
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    /// Bound how long a single scoring run may take
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Spawn the classifier, feed it `input` and collect its output
    ///
    /// Stdin is written from its own task while stdout and stderr drain, so a
    /// classifier that logs before reading cannot stall the exchange. The
    /// timeout, when set, covers the whole exchange.
    async fn run(&self, input: Vec<u8>) -> Result<std::process::Output> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Scoring(format!("failed to spawn {}: {e}", self.program)))?;

        let stdin = child.stdin.take();
        let program = self.program.clone();
        let exchange = async move {
            // Dropping stdin closes the pipe so the classifier sees EOF
            let writer = tokio::spawn(async move {
                match stdin {
                    Some(mut stdin) => stdin.write_all(&input).await,
                    None => Ok(()),
                }
            });

            let (written, output) = tokio::join!(writer, child.wait_with_output());
            match written {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(%program, error = %e, "scorer did not read all of stdin");
                }
                Err(e) => tracing::warn!(%program, error = %e, "scorer stdin task failed"),
            }
            output
        };

        // Dropping the exchange on timeout drops the child, which kills it
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| Error::Scoring(format!("scorer timed out after {limit:?}")))?,
            None => exchange.await,
        };
        output.map_err(|e| Error::Scoring(format!("scorer execution failed: {e}")))
    }
}

#[async_trait]
impl ToxicityScorer for ProcessScorer {
    async fn score(&self, texts: &[String]) -> Result<ToxicityScores> {
        let input = serde_json::to_vec(&ScoreRequest { comments: texts })?;
        tracing::debug!(program = %self.program, count = texts.len(), "running toxicity scorer");

        let output = self.run(input).await?;

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(program = %self.program, stderr = %stderr.trim(), "scorer stderr");
        }

        if !output.status.success() {
            tracing::warn!(program = %self.program, status = %output.status, "scorer exited unsuccessfully");
        }

        let scores: ToxicityScores = serde_json::from_slice(&output.stdout).map_err(|e| {
            let stdout = String::from_utf8_lossy(&output.stdout);
            tracing::error!(error = %e, stdout = %stdout.trim(), "failed to parse scorer output");
            Error::Scoring(format!("failed to parse scorer output: {e}"))
        })?;

        tracing::debug!(count = scores.scores.len(), avg = scores.avg_toxicity, "scored comments");
        Ok(scores)
    }
}
