//! Monitoring & analytics aggregation engine: log store, query engine,
//! health scorer, and trend aggregator

pub mod handler;
pub mod health;
pub mod store;
pub mod trend;

pub use handler::{monitoring_router, MonitoringState};
pub use health::{classify, health_snapshot, HealthInputs};
pub use store::{LogEventDraft, LogFilter, LogPage, LogStore, MemoryLogStore, SortOrder};
pub use trend::{growth_rate, log_trend, tenant_trend};
