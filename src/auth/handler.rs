//! HTTP handlers for the auth surface
//!
//! - POST /auth/code     — request a verification code (always 2xx)
//! - POST /auth/login    — redeem a code, establishing a session
//! - GET  /auth/session  — current identity or unauthenticated marker
//! - POST /auth/logout   — invalidate the presented session

use crate::auth::codes::CodeIssuer;
use crate::auth::guard::{bearer_token, client_address, resolve_admin, AuthState};
use crate::error::{to_json, Error, Result};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthApiState {
    pub auth: AuthState,
    pub issuer: Arc<CodeIssuer>,
}

/// Create the auth router
pub fn auth_router(state: AuthApiState) -> Router {
    Router::new()
        .route("/auth/code", post(request_code))
        .route("/auth/login", post(login))
        .route("/auth/session", get(current_session))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RequestCodeBody {
    email: String,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    code: String,
}

/// POST /auth/code
///
/// Succeeds whether or not the email is provisioned (no account
/// enumeration). Only malformed input or the rate limit fail.
async fn request_code(
    State(state): State<AuthApiState>,
    Json(body): Json<RequestCodeBody>,
) -> Result<impl IntoResponse> {
    state.issuer.request_code(&body.email).await?;
    Ok(Json(serde_json::json!({"success": true})))
}

/// POST /auth/login
async fn login(
    State(state): State<AuthApiState>,
    request: Request,
) -> Result<impl IntoResponse> {
    let address = client_address(request.headers(), request.extensions());
    let body = axum::body::to_bytes(request.into_body(), 64 * 1024)
        .await
        .map_err(|e| Error::Validation(format!("unreadable body: {}", e)))?;
    let body: LoginBody = serde_json::from_slice(&body)
        .map_err(|_| Error::Validation("email and code are required".into()))?;

    let (identity, session) = state.issuer.redeem(&body.email, &body.code, &address)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "token": session.token,
        "expiresAt": session.expires_at,
        "identity": to_json(&identity),
    })))
}

/// GET /auth/session — session optional
async fn current_session(State(state): State<AuthApiState>, request: Request) -> impl IntoResponse {
    let address = client_address(request.headers(), request.extensions());
    match resolve_admin(&state.auth, request.headers(), &address) {
        Ok(identity) => Json(serde_json::json!({
            "authenticated": true,
            "identity": to_json(&identity),
        })),
        Err(cause) => {
            tracing::debug!(cause = ?cause, "Session probe unauthenticated");
            Json(serde_json::json!({"authenticated": false}))
        }
    }
}

/// POST /auth/logout
async fn logout(State(state): State<AuthApiState>, request: Request) -> Result<impl IntoResponse> {
    let token = bearer_token(request.headers()).ok_or(Error::AuthenticationRequired)?;
    if !state.auth.store.invalidate_session(&token) {
        return Err(Error::AuthenticationRequired);
    }
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"success": true})),
    ))
}
