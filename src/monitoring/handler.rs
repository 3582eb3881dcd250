//! HTTP handlers for the monitoring API
//!
//! - POST /monitoring/logs             — ingest a log event
//! - GET  /monitoring/logs             — filtered, paginated query
//! - PUT  /monitoring/logs/:id/resolve — resolve a single event
//! - POST /monitoring/logs/resolve     — bulk resolve
//! - GET  /monitoring/dashboard        — counts + health snapshot + trends
//! - GET  /monitoring/sources          — distinct sources and categories
//! - GET  /monitoring/health           — live collaborator checks
//!
//! All routes are mounted behind the auth guard in `api.rs`.

use crate::auth::CurrentAdmin;
use crate::config::MonitoringConfig;
use crate::directory::TenantDirectory;
use crate::error::{to_json, Result};
use crate::monitoring::health::{health_snapshot, HealthInputs};
use crate::monitoring::store::{LogEventDraft, LogFilter, LogStore, SortOrder};
use crate::monitoring::trend::{growth_rate, log_trend, tenant_trend};
use crate::types::LogLevel;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Shared state for monitoring handlers
#[derive(Clone)]
pub struct MonitoringState {
    pub store: Arc<dyn LogStore>,
    pub directory: Arc<dyn TenantDirectory>,
    pub config: MonitoringConfig,
}

/// Create the monitoring router (unguarded; the caller layers the guard)
pub fn monitoring_router(state: MonitoringState) -> Router {
    Router::new()
        .route("/monitoring/logs", post(ingest_log).get(query_logs))
        .route("/monitoring/logs/:id/resolve", put(resolve_one))
        .route("/monitoring/logs/resolve", post(resolve_bulk))
        .route("/monitoring/dashboard", get(dashboard))
        .route("/monitoring/sources", get(sources))
        .route("/monitoring/health", get(health))
        .with_state(state)
}

// =============================================================================
// Query / request types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogsQuery {
    level: Option<String>,
    source: Option<String>,
    tenant_id: Option<String>,
    category: Option<String>,
    resolved: Option<bool>,
    /// Free-text search over the message
    q: Option<String>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    page: Option<usize>,
    limit: Option<usize>,
    order: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkResolveBody {
    event_ids: Vec<String>,
}

// =============================================================================
// Log handlers
// =============================================================================

/// POST /monitoring/logs
async fn ingest_log(
    State(state): State<MonitoringState>,
    Json(draft): Json<LogEventDraft>,
) -> Result<impl IntoResponse> {
    let event = state.store.ingest(draft).await?;
    Ok((StatusCode::CREATED, Json(to_json(&event))))
}

/// GET /monitoring/logs
async fn query_logs(
    State(state): State<MonitoringState>,
    Query(params): Query<LogsQuery>,
) -> Result<impl IntoResponse> {
    // Unparsable level values widen rather than error, like any absent filter
    let filter = LogFilter {
        level: params.level.as_deref().and_then(LogLevel::parse),
        source: params.source,
        tenant_id: params.tenant_id,
        category: params.category,
        resolved: params.resolved,
        search: params.q,
        from: params.from,
        to: params.to,
    };

    let limit = params
        .limit
        .unwrap_or(state.config.default_page_size)
        .min(state.config.max_page_size)
        .max(1);
    let page = params.page.unwrap_or(1).max(1);
    let order = match params.order.as_deref() {
        Some("asc") => SortOrder::Ascending,
        _ => SortOrder::Descending,
    };

    let page = state.store.query(&filter, page, limit, order).await?;
    Ok(Json(to_json(&page)))
}

/// PUT /monitoring/logs/:id/resolve
async fn resolve_one(
    State(state): State<MonitoringState>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let affected = state.store.resolve(&[id], &admin.0.email).await?;
    Ok(Json(serde_json::json!({"success": true, "affected": affected})))
}

/// POST /monitoring/logs/resolve
///
/// Unknown ids are silently skipped; the response reports the affected
/// count, not per-id outcomes. Callers needing per-id confirmation
/// re-query.
async fn resolve_bulk(
    State(state): State<MonitoringState>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(body): Json<BulkResolveBody>,
) -> Result<impl IntoResponse> {
    let affected = state.store.resolve(&body.event_ids, &admin.0.email).await?;
    Ok(Json(serde_json::json!({"success": true, "affected": affected})))
}

// =============================================================================
// Dashboard / projections
// =============================================================================

/// GET /monitoring/dashboard
async fn dashboard(State(state): State<MonitoringState>) -> Result<impl IntoResponse> {
    let now = Utc::now();
    let day_ago = now - Duration::hours(24);
    let window = Duration::days(state.config.dashboard_trend_days);

    let tenants = state.directory.counts().await?;
    let critical_24h = state.store.count_since(LogLevel::Critical, day_ago).await?;
    let error_24h = state.store.count_since(LogLevel::Error, day_ago).await?;
    let unresolved_critical = state.store.count_unresolved(LogLevel::Critical).await?;
    let unresolved_errors = state.store.count_unresolved(LogLevel::Error).await?;

    let snapshot = health_snapshot(HealthInputs {
        total_tenants: tenants.total,
        failed_tenants: tenants.failed,
        critical_logs_24h: critical_24h,
        error_logs_24h: error_24h,
        unresolved_critical,
        unresolved_errors,
    });

    let events = state.store.events_between(now - window, now).await?;
    let registrations = state.directory.created_between(now - window, now).await?;
    let current = registrations.len() as u64;
    let previous = state
        .directory
        .count_created_between(now - window - window, now - window)
        .await?;

    Ok(Json(serde_json::json!({
        "tenants": {
            "total": tenants.total,
            "active": tenants.active,
            "failed": tenants.failed,
            "growthRatePercent": growth_rate(current, previous),
        },
        "logs": {
            "critical24h": critical_24h,
            "error24h": error_24h,
            "unresolvedCritical": unresolved_critical,
            "unresolvedErrors": unresolved_errors,
        },
        "health": to_json(snapshot),
        "logTrend": to_json(log_trend(&events)),
        "tenantTrend": to_json(tenant_trend(&registrations)),
    })))
}

/// GET /monitoring/sources
async fn sources(State(state): State<MonitoringState>) -> Result<impl IntoResponse> {
    let sources = state.store.distinct_sources().await?;
    let categories = state.store.distinct_categories().await?;
    Ok(Json(serde_json::json!({
        "sources": sources,
        "categories": categories,
    })))
}

// =============================================================================
// Health endpoint
// =============================================================================

/// GET /monitoring/health
///
/// Each sub-check catches its own failure and degrades to a
/// `critical`/`unknown` entry inside the aggregate rather than failing
/// the whole request.
async fn health(State(state): State<MonitoringState>) -> impl IntoResponse {
    let log_store_check = match state.store.ping().await {
        Ok(()) => serde_json::json!({"status": "ok"}),
        Err(e) => {
            tracing::error!(error = %e, "Log store health check failed");
            serde_json::json!({"status": "critical", "message": e.to_string()})
        }
    };

    let directory_check = match state.directory.counts().await {
        Ok(counts) => serde_json::json!({"status": "ok", "tenants": counts.total}),
        Err(e) => {
            tracing::error!(error = %e, "Tenant directory health check failed");
            serde_json::json!({"status": "unknown", "message": e.to_string()})
        }
    };

    let unresolved_check = match state.store.count_unresolved(LogLevel::Critical).await {
        Ok(0) => serde_json::json!({"status": "ok", "unresolvedCritical": 0}),
        Ok(n) => serde_json::json!({"status": "critical", "unresolvedCritical": n}),
        Err(e) => serde_json::json!({"status": "unknown", "message": e.to_string()}),
    };

    let degraded = [&log_store_check, &directory_check, &unresolved_check]
        .iter()
        .any(|c| c["status"] != "ok");

    Json(serde_json::json!({
        "status": if degraded { "degraded" } else { "ok" },
        "checks": {
            "logStore": log_store_check,
            "tenantDirectory": directory_check,
            "unresolvedCritical": unresolved_check,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{MemoryTenantDirectory, TenantRecord};
    use crate::monitoring::store::MemoryLogStore;
    use crate::types::AdminIdentity;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    fn make_state() -> (MonitoringState, Arc<MemoryLogStore>, Arc<MemoryTenantDirectory>) {
        let store = Arc::new(MemoryLogStore::new());
        let directory = Arc::new(MemoryTenantDirectory::new());
        let state = MonitoringState {
            store: store.clone(),
            directory: directory.clone(),
            config: MonitoringConfig::default(),
        };
        (state, store, directory)
    }

    /// Router with the admin extension pre-attached, standing in for the guard
    fn make_app(state: MonitoringState) -> Router {
        monitoring_router(state).layer(Extension(CurrentAdmin(AdminIdentity::new(
            "ops@example.com",
            "10.0.0.1",
        ))))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 256)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_ingest_returns_created_event() {
        let (state, _store, _dir) = make_state();
        let app = make_app(state);

        let resp = app
            .oneshot(post_json(
                "/monitoring/logs",
                serde_json::json!({
                    "level": "critical",
                    "message": "Tenant down",
                    "source": "tenant-7",
                    "tenantId": "t-7",
                    "metadata": {"region": "eu-west"},
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let json = body_json(resp).await;
        assert!(json["id"].as_str().unwrap().starts_with("log-"));
        assert_eq!(json["level"], "critical");
        assert_eq!(json["tenantId"], "t-7");
        assert_eq!(json["resolved"], false);
    }

    #[tokio::test]
    async fn test_ingest_missing_fields_is_400() {
        let (state, _store, _dir) = make_state();
        let app = make_app(state);

        let resp = app
            .oneshot(post_json(
                "/monitoring/logs",
                serde_json::json!({"message": "no level or source"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_query_with_filters_and_cap() {
        let (state, store, _dir) = make_state();
        let app = make_app(state);

        for i in 0..150 {
            store
                .ingest(crate::monitoring::store::LogEventDraft {
                    level: Some("info".into()),
                    message: Some(format!("event {}", i)),
                    source: Some("system".into()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        // Caller-requested limit above the cap is clamped to 100
        let resp = app
            .clone()
            .oneshot(get("/monitoring/logs?limit=5000"))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["items"].as_array().unwrap().len(), 100);
        assert_eq!(json["total"], 150);
        assert_eq!(json["pages"], 2);

        // Level filter that matches nothing
        let resp = app
            .oneshot(get("/monitoring/logs?level=critical"))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["total"], 0);
        assert_eq!(json["pages"], 0);
    }

    #[tokio::test]
    async fn test_resolve_single_and_bulk() {
        let (state, store, _dir) = make_state();
        let app = make_app(state);

        let a = store
            .ingest(crate::monitoring::store::LogEventDraft {
                level: Some("critical".into()),
                message: Some("down".into()),
                source: Some("tenant-7".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let b = store
            .ingest(crate::monitoring::store::LogEventDraft {
                level: Some("error".into()),
                message: Some("failed".into()),
                source: Some("tenant-2".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let resp = app
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .method("PUT")
                    .uri(format!("/monitoring/logs/{}/resolve", a.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["affected"], 1);

        // Bulk: one already resolved, one fresh, one unknown — affected = 1
        let resp = app
            .oneshot(post_json(
                "/monitoring/logs/resolve",
                serde_json::json!({"eventIds": [a.id, b.id, "log-unknown"]}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["affected"], 1);
    }

    #[tokio::test]
    async fn test_dashboard_scenario_critical_event_costs_ten_points() {
        let (state, store, dir) = make_state();
        let app = make_app(state);
        dir.seed(TenantRecord {
            id: "t-7".into(),
            status: "active".into(),
            created_at: Utc::now() - Duration::days(1),
        })
        .await;

        let baseline = body_json(
            app.clone()
                .oneshot(get("/monitoring/dashboard"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(baseline["logs"]["unresolvedCritical"], 0);
        let baseline_score = baseline["health"]["score"].as_u64().unwrap();

        // Ingest a critical event for tenant-7
        let event = store
            .ingest(crate::monitoring::store::LogEventDraft {
                level: Some("critical".into()),
                message: Some("Tenant down".into()),
                source: Some("tenant-7".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let degraded = body_json(
            app.clone()
                .oneshot(get("/monitoring/dashboard"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(degraded["logs"]["unresolvedCritical"], 1);
        // One new critical costs 10 (unresolved) + 5 (24h window)
        assert_eq!(
            degraded["health"]["score"].as_u64().unwrap(),
            baseline_score - 15
        );

        // Resolving it recovers the unresolved deduction exactly
        store.resolve(&[event.id], "ops@example.com").await.unwrap();
        let recovered = body_json(
            app.clone()
                .oneshot(get("/monitoring/dashboard"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(recovered["logs"]["unresolvedCritical"], 0);
        assert_eq!(
            recovered["health"]["score"].as_u64().unwrap(),
            degraded["health"]["score"].as_u64().unwrap() + 10
        );
    }

    #[tokio::test]
    async fn test_dashboard_trends_and_growth() {
        let (state, store, dir) = make_state();
        let app = make_app(state);

        dir.seed(TenantRecord {
            id: "t-1".into(),
            status: "active".into(),
            created_at: Utc::now() - Duration::days(2),
        })
        .await;
        dir.seed(TenantRecord {
            id: "t-2".into(),
            status: "active".into(),
            created_at: Utc::now() - Duration::days(10),
        })
        .await;

        store
            .ingest(crate::monitoring::store::LogEventDraft {
                level: Some("warning".into()),
                message: Some("quota".into()),
                source: Some("tenant-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let json = body_json(app.oneshot(get("/monitoring/dashboard")).await.unwrap()).await;

        let log_trend = json["logTrend"].as_array().unwrap();
        assert_eq!(log_trend.len(), 1);
        assert_eq!(log_trend[0]["warning"], 1);
        assert_eq!(log_trend[0]["total"], 1);

        // One registration inside the 7-day window, one before it
        let tenant_trend = json["tenantTrend"].as_array().unwrap();
        assert_eq!(tenant_trend.len(), 1);
        assert_eq!(tenant_trend[0]["cumulative"], 1);
        assert_eq!(json["tenants"]["growthRatePercent"], 0.0);
    }

    #[tokio::test]
    async fn test_sources_projection() {
        let (state, store, _dir) = make_state();
        let app = make_app(state);

        for (source, category) in [("tenant-2", Some("backup")), ("tenant-1", None), ("system", Some("auth"))] {
            store
                .ingest(crate::monitoring::store::LogEventDraft {
                    level: Some("info".into()),
                    message: Some("m".into()),
                    source: Some(source.into()),
                    category: category.map(String::from),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let json = body_json(app.oneshot(get("/monitoring/sources")).await.unwrap()).await;
        assert_eq!(
            json["sources"],
            serde_json::json!(["system", "tenant-1", "tenant-2"])
        );
        assert_eq!(json["categories"], serde_json::json!(["auth", "backup"]));
    }

    #[tokio::test]
    async fn test_health_endpoint_degrades_on_unresolved_critical() {
        let (state, store, _dir) = make_state();
        let app = make_app(state);

        let json = body_json(app.clone().oneshot(get("/monitoring/health")).await.unwrap()).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["checks"]["logStore"]["status"], "ok");

        store
            .ingest(crate::monitoring::store::LogEventDraft {
                level: Some("critical".into()),
                message: Some("down".into()),
                source: Some("tenant-7".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let json = body_json(app.oneshot(get("/monitoring/health")).await.unwrap()).await;
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["checks"]["unresolvedCritical"]["status"], "critical");
        // A degraded sub-check never fails the whole request
    }
}
