//! Session store
//!
//! Owns the three auth record sets: admin identities, verification codes,
//! and established sessions. Backed by `DashMap` for per-key locking — the
//! store is the sole serialization point for auth state, so concurrent
//! requests from the same admin race only on set-union and monotonic
//! timestamp writes, both order-independent.

use crate::error::{Error, Result};
use crate::types::{AdminIdentity, Session, VerificationCode};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// In-memory store for identities, verification codes, and sessions
///
/// Session expiry is enforced here on lookup (storage-layer TTL): an
/// expired session is dropped the moment it is read, never handed back
/// to the guard.
#[derive(Default)]
pub struct SessionStore {
    /// Identities keyed by lowercased email
    identities: DashMap<String, AdminIdentity>,

    /// Outstanding verification codes keyed by lowercased email.
    /// Multiple outstanding codes per email are permitted; each is
    /// individually valid until used or expired.
    codes: DashMap<String, Vec<VerificationCode>>,

    /// Sessions keyed by bearer token
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Verification codes
    // -------------------------------------------------------------------------

    /// Persist a freshly issued verification code
    pub fn store_code(&self, code: VerificationCode) {
        self.codes
            .entry(code.email.clone())
            .or_default()
            .push(code);
    }

    /// Redeem a code, marking it used.
    ///
    /// Guarantees at-most-one successful redemption per issuance: the row
    /// is flipped to `used` under the entry lock, so a concurrent second
    /// attempt observes `used = true` and fails with `InvalidCode`.
    pub fn redeem_code(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<()> {
        let email = email.to_lowercase();
        let mut entry = self
            .codes
            .get_mut(&email)
            .ok_or(Error::InvalidCode)?;

        let row = entry
            .iter_mut()
            .find(|c| c.code == code && !c.used)
            .ok_or(Error::InvalidCode)?;

        if row.is_expired(now) {
            return Err(Error::ExpiredCode);
        }

        row.used = true;
        Ok(())
    }

    /// Drop used and expired codes (storage-owned garbage collection)
    pub fn purge_stale_codes(&self, now: DateTime<Utc>) {
        self.codes.retain(|_, rows| {
            rows.retain(|c| !c.used && !c.is_expired(now));
            !rows.is_empty()
        });
    }

    /// Outstanding (unused, unexpired) code count for an email
    pub fn outstanding_codes(&self, email: &str, now: DateTime<Utc>) -> usize {
        self.codes
            .get(&email.to_lowercase())
            .map(|rows| {
                rows.iter()
                    .filter(|c| !c.used && !c.is_expired(now))
                    .count()
            })
            .unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Identities
    // -------------------------------------------------------------------------

    /// Look up an identity by email
    pub fn identity(&self, email: &str) -> Option<AdminIdentity> {
        self.identities.get(&email.to_lowercase()).map(|r| r.clone())
    }

    /// Create the identity if missing, then union the origin address into
    /// its authorized set. Returns the resulting identity.
    pub fn authorize_address(&self, email: &str, address: &str) -> AdminIdentity {
        let key = email.to_lowercase();
        let mut entry = self
            .identities
            .entry(key.clone())
            .or_insert_with(|| AdminIdentity::new(key, address));
        entry.authorized_addresses.insert(address.to_string());
        entry.last_activity_at = Utc::now();
        entry.clone()
    }

    /// Refresh activity and union the current address. Best-effort path
    /// invoked by the auth guard after a request is already granted.
    pub fn record_activity(&self, email: &str, address: &str) -> Result<()> {
        let mut entry = self
            .identities
            .get_mut(&email.to_lowercase())
            .ok_or_else(|| Error::NotFound(format!("identity {}", email)))?;
        entry.authorized_addresses.insert(address.to_string());
        entry.last_activity_at = Utc::now();
        Ok(())
    }

    /// Remove an identity. Not reachable from this core's API surface —
    /// identities are deprovisioned out-of-band — but the guard must cope
    /// with a session that outlives its identity.
    pub fn remove_identity(&self, email: &str) -> Option<AdminIdentity> {
        self.identities.remove(&email.to_lowercase()).map(|(_, v)| v)
    }

    // -------------------------------------------------------------------------
    // Sessions
    // -------------------------------------------------------------------------

    /// Establish a new session for an identity
    pub fn create_session(&self, email: &str, ttl: Duration) -> Session {
        let now = Utc::now();
        let session = Session {
            token: format!("sess-{}", uuid::Uuid::new_v4()),
            email: email.to_lowercase(),
            created_at: now,
            expires_at: now + ttl,
        };
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Look up a session by token, enforcing expiry.
    ///
    /// Expired sessions are removed as a side effect and reported as
    /// absent — callers never see a stale session.
    pub fn session(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let expired = match self.sessions.get(token) {
            Some(session) if session.expires_at > now => return Some(session.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(token);
        }
        None
    }

    /// Slide a session's expiry window forward
    pub fn touch_session(&self, token: &str, ttl: Duration) {
        if let Some(mut session) = self.sessions.get_mut(token) {
            session.expires_at = Utc::now() + ttl;
        }
    }

    /// Invalidate a session by token
    pub fn invalidate_session(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Number of live sessions (expired entries may still be counted
    /// until their next lookup)
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
