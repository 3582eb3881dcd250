//! Log store and query engine
//!
//! Ingests operational log events from tenant services and the platform,
//! answers filtered/paginated queries, and runs the resolution workflow.
//! The store exclusively owns the `LogEvent` lifecycle: events are
//! append-only, timestamps are server-assigned at ingestion, and the only
//! permitted mutation is the resolved transition.

use crate::error::{Error, Result};
use crate::types::{LogEvent, LogLevel};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

/// Caller-supplied event awaiting validation and ingestion
///
/// Timestamps are never accepted from the caller — ingestion ordering is
/// server-assigned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEventDraft {
    pub level: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl LogEventDraft {
    /// Validate required fields and produce a stored-form event
    pub fn into_event(self) -> Result<LogEvent> {
        let level = self
            .level
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Validation("level is required".into()))?;
        let level = LogLevel::parse(level)
            .ok_or_else(|| Error::Validation(format!("unknown level '{}'", level)))?;
        let message = self
            .message
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Validation("message is required".into()))?;
        let source = self
            .source
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Validation("source is required".into()))?;

        let mut event = LogEvent::new(level, message, source);
        event.category = self.category.filter(|s| !s.is_empty());
        event.tenant_id = self.tenant_id.filter(|s| !s.is_empty());
        event.metadata = self.metadata;
        Ok(event)
    }
}

/// Composable, conjunctive query filter. Absent fields widen the result set.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub level: Option<LogLevel>,
    pub source: Option<String>,
    pub tenant_id: Option<String>,
    pub category: Option<String>,
    pub resolved: Option<bool>,
    /// Case-insensitive substring search over the message
    pub search: Option<String>,
    /// Inclusive range start
    pub from: Option<DateTime<Utc>>,
    /// Inclusive range end
    pub to: Option<DateTime<Utc>>,
}

impl LogFilter {
    /// Whether an event passes every present predicate
    pub fn matches(&self, event: &LogEvent) -> bool {
        if let Some(level) = self.level {
            if event.level != level {
                return false;
            }
        }
        if let Some(ref source) = self.source {
            if &event.source != source {
                return false;
            }
        }
        if let Some(ref tenant_id) = self.tenant_id {
            if event.tenant_id.as_deref() != Some(tenant_id.as_str()) {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if event.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(resolved) = self.resolved {
            if event.resolved != resolved {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            if !event
                .message
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(from) = self.from {
            if event.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if event.timestamp > to {
                return false;
            }
        }
        true
    }
}

/// Sort direction over the timestamp ordering key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// One page of query results plus pagination metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub items: Vec<LogEvent>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    /// ceil(total / limit); 0 when total is 0
    pub pages: usize,
}

/// Number of pages covering `total` items at `limit` per page
pub fn page_count(total: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// Persistence contract for log events
///
/// The store is the sole serialization point: each resolve-update is
/// atomic per record, and bulk resolve is a sequence of independent
/// per-record updates rather than a transaction.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Validate and persist an event with a server-assigned timestamp
    async fn ingest(&self, draft: LogEventDraft) -> Result<LogEvent>;

    /// Filtered, offset-paginated query (`page` is 1-based)
    async fn query(
        &self,
        filter: &LogFilter,
        page: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<LogPage>;

    /// Idempotent bulk resolution. Unknown ids are silently skipped;
    /// returns the number of events that actually transitioned.
    async fn resolve(&self, ids: &[String], resolved_by: &str) -> Result<usize>;

    /// Observed non-empty sources, sorted lexicographically
    async fn distinct_sources(&self) -> Result<Vec<String>>;

    /// Observed non-empty categories, sorted lexicographically
    async fn distinct_categories(&self) -> Result<Vec<String>>;

    /// Events with level `level` ingested at or after `since`
    async fn count_since(&self, level: LogLevel, since: DateTime<Utc>) -> Result<u64>;

    /// Unresolved events with level `level`
    async fn count_unresolved(&self, level: LogLevel) -> Result<u64>;

    /// All events in the inclusive window, for trend bucketing
    async fn events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LogEvent>>;

    /// Store reachability probe for the health endpoint
    async fn ping(&self) -> Result<()>;
}

/// In-memory, append-only log store
///
/// Replaces the mock global collections of the legacy console with a
/// proper store behind the query/pagination contract.
#[derive(Default)]
pub struct MemoryLogStore {
    events: RwLock<Vec<LogEvent>>,
}

impl MemoryLogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn ingest(&self, draft: LogEventDraft) -> Result<LogEvent> {
        let event = draft.into_event()?;
        self.events.write().await.push(event.clone());
        tracing::debug!(
            id = %event.id,
            level = event.level.as_str(),
            source = %event.source,
            "Log event ingested"
        );
        Ok(event)
    }

    async fn query(
        &self,
        filter: &LogFilter,
        page: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<LogPage> {
        let limit = limit.max(1);
        let page = page.max(1);

        let events = self.events.read().await;
        let mut matched: Vec<&LogEvent> = events.iter().filter(|e| filter.matches(e)).collect();
        // Stable sort: equal timestamps keep insertion order
        matched.sort_by_key(|e| e.timestamp);
        if order == SortOrder::Descending {
            matched.reverse();
        }

        let total = matched.len();
        // Saturate: an absurd page number is just a past-the-end empty page
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let items: Vec<LogEvent> = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(LogPage {
            items,
            total,
            page,
            limit,
            pages: page_count(total, limit),
        })
    }

    async fn resolve(&self, ids: &[String], resolved_by: &str) -> Result<usize> {
        let id_set: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
        let now = Utc::now();
        let mut affected = 0;

        let mut events = self.events.write().await;
        for event in events.iter_mut() {
            if id_set.contains(event.id.as_str()) && !event.resolved {
                event.resolved = true;
                event.resolved_by = Some(resolved_by.to_string());
                event.resolved_at = Some(now);
                affected += 1;
            }
        }

        tracing::info!(
            requested = ids.len(),
            affected,
            resolved_by = %resolved_by,
            "Bulk resolve applied"
        );
        Ok(affected)
    }

    async fn distinct_sources(&self) -> Result<Vec<String>> {
        let events = self.events.read().await;
        let set: BTreeSet<String> = events
            .iter()
            .map(|e| e.source.clone())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(set.into_iter().collect())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>> {
        let events = self.events.read().await;
        let set: BTreeSet<String> = events
            .iter()
            .filter_map(|e| e.category.clone())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(set.into_iter().collect())
    }

    async fn count_since(&self, level: LogLevel, since: DateTime<Utc>) -> Result<u64> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.level == level && e.timestamp >= since)
            .count() as u64)
    }

    async fn count_unresolved(&self, level: LogLevel) -> Result<u64> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.level == level && !e.resolved)
            .count() as u64)
    }

    async fn events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LogEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.timestamp >= from && e.timestamp <= to)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        let _ = self.events.read().await;
        Ok(())
    }
}
