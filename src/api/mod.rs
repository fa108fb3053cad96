//! HTTP API server for Toxiscope
//!
//! ```text
//!   POST /api/analyze           analyze one page of comments
//!   POST /api/analyze/save      save analyzed comments      (bearer token)
//!   GET  /api/analyze/history   saved comments, newest first (bearer token)
//!   POST /api/auth/signup
//!   POST /api/auth/login
//!   GET  /health, /ready
//! ```

pub mod analyze;
pub mod auth;
pub mod error;
pub mod health;
pub mod jwt;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::db::{CommentRepo, DbPool, UserRepo};
use crate::pipeline::Analyzer;

pub use auth::AuthUser;
pub use error::ApiError;
pub use jwt::TokenIssuer;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub db: DbPool,
    pub users: UserRepo,
    pub comments: CommentRepo,
    pub analyzer: Analyzer,
    pub tokens: Arc<TokenIssuer>,
}

impl ApiState {
    #[must_use]
    pub fn new(db: DbPool, analyzer: Analyzer, tokens: TokenIssuer) -> Self {
        Self {
            users: UserRepo::new(db.clone()),
            comments: CommentRepo::new(db.clone()),
            db,
            analyzer,
            tokens: Arc::new(tokens),
        }
    }
}

/// Build the router with all routes
///
/// When `static_dir` is set, unmatched paths are served from it with
/// `index.html` as the fallback for client-side routes.
pub fn router(state: Arc<ApiState>, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .merge(analyze::router(state.clone()))
        .merge(auth::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state));

    if let Some(static_dir) = static_dir {
        let index_file = static_dir.join("index.html");
        let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

        router = router.fallback_service(serve_dir);
        tracing::info!(path = %static_dir.display(), "serving static files");
    }

    // Dashboard may be served from another origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    db: DbPool,
    analyzer: Analyzer,
    tokens: TokenIssuer,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub const fn new(db: DbPool, analyzer: Analyzer, tokens: TokenIssuer, port: u16) -> Self {
        Self {
            db,
            analyzer,
            tokens,
            port,
            static_dir: None,
        }
    }

    /// Set the static files directory for serving the dashboard
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        ApiServer {
            state: Arc::new(ApiState::new(self.db, self.analyzer, self.tokens)),
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        let app = router(self.state, self.static_dir.as_deref());
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
