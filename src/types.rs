//! Core types for the operator console
//!
//! All types use camelCase JSON serialization for wire compatibility.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Severity level of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Informational (e.g., tenant provisioned, backup completed)
    Info,
    /// Warning (e.g., approaching quota)
    Warning,
    /// Error (e.g., request failure)
    Error,
    /// Critical (e.g., tenant down, data loss risk)
    Critical,
}

impl LogLevel {
    /// Parse a level from its wire representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(LogLevel::Info),
            "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            "critical" => Some(LogLevel::Critical),
            _ => None,
        }
    }

    /// Wire representation of this level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }
}

/// A single operational log event ingested from a tenant or the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Unique event identifier (log-<uuid>)
    pub id: String,

    /// Severity level
    pub level: LogLevel,

    /// Human-readable message
    pub message: String,

    /// Producing tenant name or "system"
    pub source: String,

    /// Optional grouping category (e.g., "backup", "billing")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Unvalidated back-reference into the tenant directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// Server-assigned ingestion timestamp. Immutable; sole ordering key
    /// for trend buckets.
    pub timestamp: DateTime<Utc>,

    /// Open key-value metadata (scalar values by convention)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Resolution workflow state. Always false at creation.
    #[serde(default)]
    pub resolved: bool,

    /// Admin email that resolved this event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,

    /// Set if-and-only-if resolved is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl LogEvent {
    /// Create a new unresolved event with auto-generated id and timestamp
    pub fn new(level: LogLevel, message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: format!("log-{}", uuid::Uuid::new_v4()),
            level,
            message: message.into(),
            source: source.into(),
            category: None,
            tenant_id: None,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        }
    }

    /// Set the grouping category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the tenant back-reference
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// An authenticated operator account, pinned to a growing set of
/// authorized network origins
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentity {
    /// Unique email, stored lowercased
    pub email: String,

    /// Network addresses this admin may operate from. Append-only during
    /// normal operation; an identity with zero addresses can never pass
    /// the auth guard.
    pub authorized_addresses: BTreeSet<String>,

    /// Refreshed on every authenticated request
    pub last_activity_at: DateTime<Utc>,

    /// Creation timestamp (first successful code redemption)
    pub created_at: DateTime<Utc>,
}

impl AdminIdentity {
    /// Create a new identity authorized for a single origin address
    pub fn new(email: impl Into<String>, address: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut addresses = BTreeSet::new();
        addresses.insert(address.into());
        Self {
            email: email.into().to_lowercase(),
            authorized_addresses: addresses,
            last_activity_at: now,
            created_at: now,
        }
    }
}

/// A short-lived, single-use numeric credential delivered by email
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationCode {
    /// Target email, stored lowercased
    pub email: String,

    /// 6-digit numeric code
    pub code: String,

    /// Redemption deadline
    pub expires_at: DateTime<Utc>,

    /// Once true, redemption must fail
    pub used: bool,

    /// Issuance timestamp
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Check whether this code is past its redemption deadline
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// An established admin session referencing an identity by email
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque bearer token (sess-<uuid>)
    pub token: String,

    /// Identity reference (lowercased email)
    pub email: String,

    /// Session creation timestamp
    pub created_at: DateTime<Utc>,

    /// Sliding expiry, refreshed on authenticated use
    pub expires_at: DateTime<Utc>,
}

/// Classification bands for the health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Score ≥ 95
    Excellent,
    /// Score ≥ 85
    Good,
    /// Score ≥ 70
    Fair,
    /// Everything below
    Poor,
}

/// Point-in-time derived health value. Recomputed on every dashboard
/// request; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    /// 0–100 system-health score
    pub score: u8,

    /// Band classification of the score
    pub status: HealthStatus,
}

/// A day-granularity aggregation of log events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    /// UTC calendar day
    pub date: NaiveDate,

    /// Count of info events on this day
    pub info: u64,

    /// Count of warning events on this day
    pub warning: u64,

    /// Count of error events on this day
    pub error: u64,

    /// Count of critical events on this day
    pub critical: u64,

    /// Total events on this day
    pub total: u64,
}

impl TrendBucket {
    /// Empty bucket for a day
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            info: 0,
            warning: 0,
            error: 0,
            critical: 0,
            total: 0,
        }
    }
}

/// A day-granularity tenant-registration point with running cumulative sum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantTrendPoint {
    /// UTC calendar day
    pub date: NaiveDate,

    /// Registrations on this day
    pub count: u64,

    /// Running sum across the ascending-by-date series
    pub cumulative: u64,
}
