//! Tenant directory collaborator
//!
//! The directory is the external system of record for registered tenant
//! instances. This core only reads from it: counts feed the health scorer,
//! creation timestamps feed the registration trend. Nothing here mutates
//! tenant records.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Tenant population counts used by the health scorer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCounts {
    /// All registered tenants
    pub total: u64,

    /// Tenants in active/running status
    pub active: u64,

    /// Tenants whose provisioning or runtime has failed
    pub failed: u64,
}

/// Read-only view of the external tenant directory
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Current tenant population counts
    async fn counts(&self) -> Result<TenantCounts>;

    /// Creation timestamps of tenants registered in `[from, to)`
    async fn created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>>;

    /// Number of tenants registered in `[from, to)`
    async fn count_created_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<u64> {
        Ok(self.created_between(from, to).await?.len() as u64)
    }
}

/// Minimal tenant record held by the in-memory directory
#[derive(Debug, Clone)]
pub struct TenantRecord {
    /// Directory identifier
    pub id: String,

    /// Provisioning status (e.g., "active", "failed", "pending")
    pub status: String,

    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// In-memory tenant directory
///
/// Stands in for the real directory service in the default binary and in
/// tests. Seeded out-of-band; this core never writes tenant records.
#[derive(Default)]
pub struct MemoryTenantDirectory {
    tenants: RwLock<Vec<TenantRecord>>,
}

impl MemoryTenantDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tenant record (test/bootstrap helper)
    pub async fn seed(&self, record: TenantRecord) {
        self.tenants.write().await.push(record);
    }
}

#[async_trait]
impl TenantDirectory for MemoryTenantDirectory {
    async fn counts(&self) -> Result<TenantCounts> {
        let tenants = self.tenants.read().await;
        let mut counts = TenantCounts {
            total: tenants.len() as u64,
            ..Default::default()
        };
        for tenant in tenants.iter() {
            match tenant.status.as_str() {
                "active" => counts.active += 1,
                "failed" => counts.failed += 1,
                _ => {}
            }
        }
        Ok(counts)
    }

    async fn created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let tenants = self.tenants.read().await;
        Ok(tenants
            .iter()
            .filter(|t| t.created_at >= from && t.created_at < to)
            .map(|t| t.created_at)
            .collect())
    }
}
