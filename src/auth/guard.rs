//! Auth guard middleware
//!
//! Gate evaluated before every protected operation. Per request the guard
//! walks `Unauthenticated → SessionPresent → IdentityResolved →
//! AddressAuthorized → Granted`, short-circuiting to a denial at any step:
//!
//! - no bearer token, or token unknown/expired → `AuthenticationRequired`
//! - session whose identity no longer exists → session invalidated, then
//!   `InvalidSession`
//! - origin address absent from the identity's authorized set →
//!   `AddressNotAuthorized` — a stolen session token replayed from an
//!   unrecognized network origin is rejected even though the session
//!   itself is still live
//!
//! All three causes respond uniformly as 401; tracing carries the
//! distinction for audit.

use crate::auth::store::SessionStore;
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::types::AdminIdentity;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state for the auth guard and auth handlers
#[derive(Clone)]
pub struct AuthState {
    pub store: Arc<SessionStore>,
    pub config: AuthConfig,
}

/// The resolved admin identity, attached to granted requests
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub AdminIdentity);

/// Extract the request's origin address.
///
/// Prefers the first `x-forwarded-for` hop (the console sits behind the
/// platform edge), falls back to the socket peer address, else "unknown".
pub fn client_address(headers: &HeaderMap, extensions: &axum::http::Extensions) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    if let Some(ConnectInfo(addr)) = extensions.get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    "unknown".to_string()
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the identity behind a request, enforcing session validity and
/// address pinning. Shared by the middleware and the optional-session
/// `/auth/session` handler.
pub fn resolve_admin(state: &AuthState, headers: &HeaderMap, address: &str) -> Result<AdminIdentity> {
    let token = bearer_token(headers).ok_or(Error::AuthenticationRequired)?;

    let session = state
        .store
        .session(&token, Utc::now())
        .ok_or(Error::AuthenticationRequired)?;

    let identity = match state.store.identity(&session.email) {
        Some(identity) => identity,
        None => {
            // Orphaned session: invalidate as a side effect
            state.store.invalidate_session(&token);
            tracing::warn!(email = %session.email, "Session referenced a deleted identity");
            return Err(Error::InvalidSession);
        }
    };

    if !identity.authorized_addresses.contains(address) {
        return Err(Error::AddressNotAuthorized(address.to_string()));
    }

    // Activity updater: best-effort companion that must never fail the
    // granted request. Refreshes lastActivityAt, unions the current
    // address, and slides the session window.
    if let Err(e) = state.store.record_activity(&identity.email, address) {
        tracing::warn!(email = %identity.email, error = %e, "Activity update failed");
    }
    state
        .store
        .touch_session(&token, Duration::hours(state.config.session_ttl_hours));

    Ok(identity)
}

/// Axum middleware enforcing the guard on every protected route
pub async fn require_admin(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let address = client_address(request.headers(), request.extensions());
    let identity = resolve_admin(&state, request.headers(), &address)?;

    request.extensions_mut().insert(CurrentAdmin(identity));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use tower::ServiceExt;

    fn auth_state() -> AuthState {
        AuthState {
            store: Arc::new(SessionStore::new()),
            config: AuthConfig::default(),
        }
    }

    async fn whoami(Extension(admin): Extension<CurrentAdmin>) -> String {
        admin.0.email
    }

    fn app(state: AuthState) -> Router {
        Router::new()
            .route("/protected", get(whoami))
            .layer(middleware::from_fn_with_state(state, require_admin))
    }

    fn request(token: Option<&str>, addr: &str) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder()
            .uri("/protected")
            .header("x-forwarded-for", addr);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_no_session_denied() {
        let state = auth_state();
        let resp = app(state).oneshot(request(None, "10.0.0.1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_token_denied() {
        let state = auth_state();
        let resp = app(state)
            .oneshot(request(Some("sess-bogus"), "10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_deleted_identity_denied_and_session_invalidated() {
        let state = auth_state();
        state.store.authorize_address("ops@example.com", "10.0.0.1");
        let session = state
            .store
            .create_session("ops@example.com", chrono::Duration::hours(24));
        state.store.remove_identity("ops@example.com");

        let resp = app(state.clone())
            .oneshot(request(Some(&session.token), "10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        // Side effect: the orphaned session is gone
        assert!(state.store.session(&session.token, Utc::now()).is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_address_denied() {
        let state = auth_state();
        state.store.authorize_address("ops@example.com", "10.0.0.1");
        let session = state
            .store
            .create_session("ops@example.com", chrono::Duration::hours(24));

        let resp = app(state)
            .oneshot(request(Some(&session.token), "203.0.113.9"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_granted_attaches_identity_and_refreshes_activity() {
        let state = auth_state();
        let before = state.store.authorize_address("ops@example.com", "10.0.0.1");
        let session = state
            .store
            .create_session("ops@example.com", chrono::Duration::hours(24));

        let resp = app(state.clone())
            .oneshot(request(Some(&session.token), "10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"ops@example.com");

        let after = state.store.identity("ops@example.com").unwrap();
        assert!(after.last_activity_at >= before.last_activity_at);
    }

    #[tokio::test]
    async fn test_client_address_prefers_forwarded_header() {
        let headers = {
            let mut h = HeaderMap::new();
            h.insert("x-forwarded-for", "198.51.100.7, 10.0.0.2".parse().unwrap());
            h
        };
        let addr = client_address(&headers, &axum::http::Extensions::new());
        assert_eq!(addr, "198.51.100.7");
    }

    #[tokio::test]
    async fn test_client_address_unknown_without_hints() {
        let addr = client_address(&HeaderMap::new(), &axum::http::Extensions::new());
        assert_eq!(addr, "unknown");
    }

    #[tokio::test]
    async fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert("authorization", "Bearer sess-abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("sess-abc"));

        headers.insert("authorization", "Basic dXNlcg==".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }
}
