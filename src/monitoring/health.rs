//! Health scorer
//!
//! Derives a single 0–100 system-health number from tenant and log
//! counts. Pure and stateless: identical inputs always yield the same
//! snapshot, so the score is consistent with the underlying data at read
//! time and there is no stale-cache class of bugs.

use crate::types::{HealthSnapshot, HealthStatus};
use serde::{Deserialize, Serialize};

/// Inputs to the health score
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInputs {
    pub total_tenants: u64,
    pub failed_tenants: u64,
    /// Critical events ingested in the last 24 hours
    pub critical_logs_24h: u64,
    /// Error events ingested in the last 24 hours
    pub error_logs_24h: u64,
    pub unresolved_critical: u64,
    pub unresolved_errors: u64,
}

/// Compute the health snapshot.
///
/// ```text
/// score = 100
/// if totalTenants > 0: score -= (failedTenants / totalTenants) * 30
/// score -= min(criticalLogs24h * 5, 25)
/// score -= min(errorLogs24h * 1, 20)
/// score -= unresolvedCritical * 10
/// score -= unresolvedErrors * 3
/// score = clamp(round(score), 0, 100)
/// ```
pub fn health_snapshot(inputs: HealthInputs) -> HealthSnapshot {
    let mut score = 100.0_f64;

    if inputs.total_tenants > 0 {
        score -= (inputs.failed_tenants as f64 / inputs.total_tenants as f64) * 30.0;
    }
    score -= (inputs.critical_logs_24h as f64 * 5.0).min(25.0);
    score -= (inputs.error_logs_24h as f64).min(20.0);
    score -= inputs.unresolved_critical as f64 * 10.0;
    score -= inputs.unresolved_errors as f64 * 3.0;

    let score = score.round().clamp(0.0, 100.0) as u8;
    HealthSnapshot {
        score,
        status: classify(score),
    }
}

/// Band classification: ≥95 excellent, ≥85 good, ≥70 fair, else poor
pub fn classify(score: u8) -> HealthStatus {
    match score {
        95..=u8::MAX => HealthStatus::Excellent,
        85..=94 => HealthStatus::Good,
        70..=84 => HealthStatus::Fair,
        _ => HealthStatus::Poor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_health() {
        let snapshot = health_snapshot(HealthInputs::default());
        assert_eq!(snapshot.score, 100);
        assert_eq!(snapshot.status, HealthStatus::Excellent);
    }

    #[test]
    fn test_deterministic() {
        let inputs = HealthInputs {
            total_tenants: 10,
            failed_tenants: 1,
            critical_logs_24h: 2,
            error_logs_24h: 5,
            unresolved_critical: 1,
            unresolved_errors: 2,
        };
        assert_eq!(health_snapshot(inputs), health_snapshot(inputs));
    }

    #[test]
    fn test_exact_deductions() {
        // 100 - 3 (1/10 failed) - 10 (2 critical) - 5 (errors) = 82
        let snapshot = health_snapshot(HealthInputs {
            total_tenants: 10,
            failed_tenants: 1,
            critical_logs_24h: 2,
            error_logs_24h: 5,
            ..Default::default()
        });
        assert_eq!(snapshot.score, 82);
        assert_eq!(snapshot.status, HealthStatus::Fair);
    }

    #[test]
    fn test_recent_log_deductions_are_capped() {
        let snapshot = health_snapshot(HealthInputs {
            critical_logs_24h: 100,
            error_logs_24h: 100,
            ..Default::default()
        });
        // 100 - 25 - 20 = 55
        assert_eq!(snapshot.score, 55);
        assert_eq!(snapshot.status, HealthStatus::Poor);
    }

    #[test]
    fn test_unresolved_deductions_are_uncapped_and_clamped() {
        let snapshot = health_snapshot(HealthInputs {
            unresolved_critical: 20,
            ..Default::default()
        });
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.status, HealthStatus::Poor);
    }

    #[test]
    fn test_unresolved_critical_costs_exactly_ten() {
        let base = health_snapshot(HealthInputs::default());
        let one = health_snapshot(HealthInputs {
            unresolved_critical: 1,
            critical_logs_24h: 0,
            ..Default::default()
        });
        assert_eq!(base.score - one.score, 10);
    }

    #[test]
    fn test_monotonic_in_failed_tenants_and_unresolved_critical() {
        let mut prev = u8::MAX;
        for failed in 0..=10 {
            let s = health_snapshot(HealthInputs {
                total_tenants: 10,
                failed_tenants: failed,
                ..Default::default()
            });
            assert!(s.score <= prev);
            prev = s.score;
        }

        let mut prev = u8::MAX;
        for unresolved in 0..=12 {
            let s = health_snapshot(HealthInputs {
                unresolved_critical: unresolved,
                ..Default::default()
            });
            assert!(s.score <= prev);
            prev = s.score;
        }
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(classify(100), HealthStatus::Excellent);
        assert_eq!(classify(95), HealthStatus::Excellent);
        assert_eq!(classify(94), HealthStatus::Good);
        assert_eq!(classify(85), HealthStatus::Good);
        assert_eq!(classify(84), HealthStatus::Fair);
        assert_eq!(classify(70), HealthStatus::Fair);
        assert_eq!(classify(69), HealthStatus::Poor);
        assert_eq!(classify(0), HealthStatus::Poor);
    }

    #[test]
    fn test_zero_tenants_skips_ratio_term() {
        // failed > 0 with total = 0 must not divide by zero
        let snapshot = health_snapshot(HealthInputs {
            total_tenants: 0,
            failed_tenants: 5,
            ..Default::default()
        });
        assert_eq!(snapshot.score, 100);
    }
}
