//! Toxiscope - comment toxicity analysis for social media posts
//!
//! This library provides the core functionality for Toxiscope:
//! - Post URL classification (Instagram, YouTube, Facebook)
//! - Comment fetching through RapidAPI scrapers
//! - Emoji cleanup and scoring via an external classifier process
//! - Incremental "load more" merging
//! - Saved analyses behind token-authenticated accounts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 HTTP API (axum)                      │
//! │   analyze  │  save  │  history  │  signup / login    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Analyzer                          │
//! │   classify ─► fetch page ─► clean ─► score ─► merge │
//! └──────────┬─────────────────────────────┬────────────┘
//!            │                             │
//! ┌──────────▼──────────┐       ┌──────────▼──────────┐
//! │  RapidAPI scrapers  │       │  classifier process │
//! └─────────────────────┘       └─────────────────────┘
//! ```

pub mod api;
pub mod comment;
pub mod config;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod scoring;
pub mod stats;

pub use comment::{AnalysisResult, Comment, CommentPage, ScoredComment};
pub use config::Config;
pub use db::DbPool;
pub use error::{Error, Result};
pub use pipeline::{Analyzer, CommentFeed, MergeOutcome};
pub use platform::{CommentSource, Platform, PostTarget, RapidApiClient, UpstreamConfig};
pub use scoring::{ProcessScorer, ToxicityScorer, ToxicityScores};
pub use stats::{LengthClass, ToxicitySummary};
