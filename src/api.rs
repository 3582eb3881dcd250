//! Unified API router for the operator console
//!
//! Merges the auth and monitoring routers into a single axum `Router`
//! with CORS and the auth guard layered over every monitoring route.
//!
//! ## Endpoint Map
//!
//! | Path                              | Auth     | Description                       |
//! |-----------------------------------|----------|-----------------------------------|
//! | `POST /auth/code`                 | none     | Request a verification code       |
//! | `POST /auth/login`                | none     | Redeem a code, set session        |
//! | `GET /auth/session`               | optional | Current identity or marker        |
//! | `POST /auth/logout`               | session  | Invalidate session                |
//! | `POST /monitoring/logs`           | guarded  | Ingest a log event                |
//! | `GET /monitoring/logs`            | guarded  | Filtered, paginated query         |
//! | `PUT /monitoring/logs/:id/resolve`| guarded  | Resolve one event                 |
//! | `POST /monitoring/logs/resolve`   | guarded  | Bulk resolve                      |
//! | `GET /monitoring/dashboard`       | guarded  | Counts + health + trends          |
//! | `GET /monitoring/sources`         | guarded  | Distinct sources/categories       |
//! | `GET /monitoring/health`          | guarded  | Live collaborator checks          |

use crate::auth::codes::CodeIssuer;
use crate::auth::guard::{require_admin, AuthState};
use crate::auth::handler::{auth_router, AuthApiState};
use crate::auth::store::SessionStore;
use crate::config::ConsoleConfig;
use crate::directory::TenantDirectory;
use crate::email::EmailDelivery;
use crate::monitoring::handler::{monitoring_router, MonitoringState};
use crate::monitoring::store::LogStore;
use axum::http::{header, Method};
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete console HTTP application
pub fn build_app(
    config: &ConsoleConfig,
    log_store: Arc<dyn LogStore>,
    directory: Arc<dyn TenantDirectory>,
    email: Arc<dyn EmailDelivery>,
) -> Router {
    let session_store = Arc::new(SessionStore::new());
    let auth_state = AuthState {
        store: session_store.clone(),
        config: config.auth.clone(),
    };
    let issuer = Arc::new(CodeIssuer::new(
        session_store,
        email,
        config.auth.clone(),
    ));

    let monitoring = monitoring_router(MonitoringState {
        store: log_store,
        directory,
        config: config.monitoring.clone(),
    })
    .layer(middleware::from_fn_with_state(
        auth_state.clone(),
        require_admin,
    ));

    Router::new()
        .merge(auth_router(AuthApiState {
            auth: auth_state,
            issuer,
        }))
        .merge(monitoring)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config.server.cors_origins))
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}
