//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use secrecy::SecretString;
use serde_json::Value;
use toxiscope::api::{self, ApiState, TokenIssuer};
use toxiscope::{
    Analyzer, Comment, CommentPage, CommentSource, DbPool, Error, PostTarget, Result,
    ToxicityScorer, ToxicityScores, db,
};

pub const TEST_SECRET: &str = "test-secret";

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Comment source serving canned pages keyed by post identifier
#[derive(Default)]
pub struct FakeSource {
    pages: HashMap<String, CommentPage>,
    pub requests: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeSource {
    #[must_use]
    pub fn with_page(mut self, identifier: &str, page: CommentPage) -> Self {
        self.pages.insert(identifier.to_string(), page);
        self
    }
}

#[async_trait]
impl CommentSource for FakeSource {
    async fn fetch_page(&self, target: &PostTarget, token: Option<&str>) -> Result<CommentPage> {
        self.requests
            .lock()
            .unwrap()
            .push((target.identifier().to_string(), token.map(String::from)));
        self.pages
            .get(target.identifier())
            .cloned()
            .ok_or_else(|| Error::Fetch(format!("no fixture for {}", target.identifier())))
    }
}

/// Scorer returning fixed scores regardless of input
pub struct FakeScorer {
    pub scores: Vec<f64>,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl FakeScorer {
    #[must_use]
    pub fn new(scores: Vec<f64>) -> Self {
        Self {
            scores,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ToxicityScorer for FakeScorer {
    #[allow(clippy::cast_precision_loss)]
    async fn score(&self, texts: &[String]) -> Result<ToxicityScores> {
        self.calls.lock().unwrap().push(texts.to_vec());
        let avg = if self.scores.is_empty() {
            0.0
        } else {
            self.scores.iter().sum::<f64>() / self.scores.len() as f64
        };
        Ok(ToxicityScores {
            scores: self.scores.clone(),
            avg_toxicity: avg,
        })
    }
}

#[must_use]
pub fn comment(id: &str, username: &str, text: &str) -> Comment {
    Comment {
        id: id.to_string(),
        username: username.to_string(),
        text: text.to_string(),
    }
}

#[must_use]
pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(&SecretString::from(TEST_SECRET.to_string()))
}

/// Build the full API router over fakes
pub fn build_test_router(source: Arc<FakeSource>, scorer: Arc<FakeScorer>) -> Router {
    let analyzer = Analyzer::new(source, scorer);
    let state = Arc::new(ApiState::new(setup_test_db(), analyzer, token_issuer()));
    api::router(state, None)
}

/// Build a JSON POST request, optionally with a bearer token
#[must_use]
pub fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a GET request, optionally with a bearer token
#[must_use]
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON
pub async fn json_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
