//! Trend aggregator
//!
//! Buckets log events and tenant registrations by UTC calendar day for
//! dashboard time series. Series are sparse: days with zero events are
//! not synthesized, and consumers must handle gaps. Nothing here is
//! persisted; every call recomputes from the timestamps it is given.

use crate::types::{LogEvent, LogLevel, TenantTrendPoint, TrendBucket};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Bucket log events by calendar day, ascending by date.
///
/// Only the event timestamp participates — it is the sole ordering key.
pub fn log_trend(events: &[LogEvent]) -> Vec<TrendBucket> {
    let mut buckets: BTreeMap<chrono::NaiveDate, TrendBucket> = BTreeMap::new();

    for event in events {
        let date = event.timestamp.date_naive();
        let bucket = buckets
            .entry(date)
            .or_insert_with(|| TrendBucket::empty(date));
        match event.level {
            LogLevel::Info => bucket.info += 1,
            LogLevel::Warning => bucket.warning += 1,
            LogLevel::Error => bucket.error += 1,
            LogLevel::Critical => bucket.critical += 1,
        }
        bucket.total += 1;
    }

    buckets.into_values().collect()
}

/// Bucket tenant registration timestamps by calendar day and carry a
/// running cumulative sum across the ascending series.
///
/// The cumulative column is the only ordering-sensitive derived value in
/// the system: it is computed after a stable ascending sort, never on
/// out-of-order input. An empty input yields an empty series.
pub fn tenant_trend(created_ats: &[DateTime<Utc>]) -> Vec<TenantTrendPoint> {
    let mut counts: BTreeMap<chrono::NaiveDate, u64> = BTreeMap::new();
    for ts in created_ats {
        *counts.entry(ts.date_naive()).or_insert(0) += 1;
    }

    let mut cumulative = 0u64;
    counts
        .into_iter()
        .map(|(date, count)| {
            cumulative += count;
            TenantTrendPoint {
                date,
                count,
                cumulative,
            }
        })
        .collect()
}

/// Growth of `current` over `previous` as a percentage.
///
/// Division by zero is avoided by encoding "growth from nothing" as a
/// full 100% rather than undefined/infinite: previous = 0 yields 100%
/// when current > 0, else 0%.
pub fn growth_rate(current: u64, previous: u64) -> f64 {
    if previous > 0 {
        ((current as f64 - previous as f64) / previous as f64) * 100.0
    } else if current > 0 {
        100.0
    } else {
        0.0
    }
}
