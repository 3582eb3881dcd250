//! # opsconsole
//!
//! Monitoring & analytics aggregation core for a multi-tenant hosting
//! operator console, gated behind session-pinned administrator auth.
//!
//! ## Overview
//!
//! The crate ingests heterogeneous operational log events from tenant
//! services and the platform, answers filtered/paginated queries over
//! them, tracks a resolution workflow, derives a deterministic 0–100
//! health score, and produces day-bucketed trend series for dashboards.
//! Every monitoring operation sits behind an auth guard that enforces
//! session validity and network-origin pinning.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use opsconsole::api::build_app;
//! use opsconsole::config::ConsoleConfig;
//! use opsconsole::directory::MemoryTenantDirectory;
//! use opsconsole::email::TracingEmailDelivery;
//! use opsconsole::monitoring::MemoryLogStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ConsoleConfig::default();
//! let app = build_app(
//!     &config,
//!     Arc::new(MemoryLogStore::new()),
//!     Arc::new(MemoryTenantDirectory::new()),
//!     Arc::new(TracingEmailDelivery),
//! );
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:18920").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **SessionStore** — identities, verification codes, sessions (TTL on read)
//! - **CodeIssuer** — one-time email code issuance and redemption
//! - **Auth guard** — per-request session + address-pinning gate
//! - **LogStore** trait — pluggable log persistence (`MemoryLogStore` built in)
//! - **Health scorer / trend aggregator** — pure derivations, never persisted
//! - External collaborators: **TenantDirectory** (read-only) and
//!   **EmailDelivery** (fire-and-forget)

pub mod api;
pub mod auth;
pub mod config;
pub mod directory;
pub mod email;
pub mod error;
pub mod monitoring;
pub mod types;

// Re-export core types
pub use api::build_app;
pub use auth::{AuthState, CodeIssuer, CurrentAdmin, SessionStore};
pub use config::ConsoleConfig;
pub use directory::{MemoryTenantDirectory, TenantCounts, TenantDirectory};
pub use email::{EmailDelivery, TracingEmailDelivery};
pub use error::{Error, Result};
pub use monitoring::{LogFilter, LogStore, MemoryLogStore};
pub use types::{
    AdminIdentity, HealthSnapshot, HealthStatus, LogEvent, LogLevel, TenantTrendPoint, TrendBucket,
    VerificationCode,
};
