//! Account signup/login and session token middleware

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State, rejection::JsonRejection},
    middleware::Next,
    response::Response,
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use super::error::ApiError;
use crate::Error;

/// Work factor for password hashes
pub const BCRYPT_COST: u32 = 10;

/// Authenticated caller, injected into request extensions by [`require_user`]
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub token: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Serialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
}

/// Extract the bearer token from the Authorization header
fn extract_bearer(req: &Request) -> Option<&str> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware requiring a valid session token
pub async fn require_user(
    State(state): State<Arc<ApiState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(&req) else {
        tracing::debug!("no session token provided");
        return Err(Error::Auth("Access denied. No token provided.".to_string()).into());
    };

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| Error::Auth("Invalid token.".to_string()))?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
    });
    Ok(next.run(req).await)
}

/// Create an account and return a session token
async fn signup(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    if [&req.name, &req.email, &req.password]
        .iter()
        .any(|f| f.trim().is_empty())
    {
        return Err(Error::Validation("Name, email and password are required".to_string()).into());
    }

    if state.users.find_by_email(&req.email)?.is_some() {
        return Err(Error::Conflict("User already exists".to_string()).into());
    }

    let password = req.password;
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;

    let user = state.users.create(req.name.trim(), &req.email, &hash)?;
    let token = state.tokens.issue(&user)?;

    Ok(Json(SignupResponse {
        message: "Signup successful",
        token,
    }))
}

/// Check credentials and return a session token
async fn login(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    let user = state
        .users
        .find_by_email(&req.email)?
        .ok_or_else(|| Error::InvalidCredentials("User not found".to_string()))?;

    let password = req.password;
    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
        .unwrap_or(false);

    if !matches {
        tracing::debug!(user_id = %user.id, "password mismatch");
        return Err(Error::InvalidCredentials("Invalid password".to_string()).into());
    }

    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        user: UserSummary {
            name: user.name,
            email: user.email,
        },
    }))
}

/// Build auth router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .with_state(state)
}
