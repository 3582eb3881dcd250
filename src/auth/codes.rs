//! Verification code issuance and redemption
//!
//! Codes are 6-digit, cryptographically random, single-use, and short-lived.
//! Issuance always reports success to the caller regardless of whether the
//! email is provisioned, so the endpoint cannot be used for account
//! enumeration. Redemption is the only path that creates identities and
//! sessions.

use crate::auth::store::SessionStore;
use crate::config::AuthConfig;
use crate::email::EmailDelivery;
use crate::error::{Error, Result};
use crate::types::{AdminIdentity, Session, VerificationCode};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::Arc;

/// Issues and redeems one-time email verification codes
pub struct CodeIssuer {
    store: Arc<SessionStore>,
    delivery: Arc<dyn EmailDelivery>,
    config: AuthConfig,

    /// Recent issuance timestamps per email, for the request rate limit
    request_log: DashMap<String, Vec<DateTime<Utc>>>,
}

impl CodeIssuer {
    /// Create a new issuer over the given store and delivery backend
    pub fn new(
        store: Arc<SessionStore>,
        delivery: Arc<dyn EmailDelivery>,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            delivery,
            config,
            request_log: DashMap::new(),
        }
    }

    /// Generate, persist, and dispatch a verification code.
    ///
    /// Returns `Ok` whether or not the email maps to a provisioned admin;
    /// only a malformed address or the rate limit produce an error. Email
    /// delivery failure is logged and swallowed — delivery is fire-and-forget.
    pub async fn request_code(&self, email: &str) -> Result<()> {
        let email = normalize_email(email)?;
        self.check_rate_limit(&email)?;

        let now = Utc::now();
        let code = generate_code();
        self.store.store_code(VerificationCode {
            email: email.clone(),
            code: code.clone(),
            expires_at: now + Duration::minutes(self.config.code_ttl_minutes),
            used: false,
            created_at: now,
        });

        if let Err(e) = self.delivery.send_code(&email, &code).await {
            tracing::warn!(email = %email, error = %e, "Code delivery failed");
        }

        // Opportunistic GC of used/expired rows and idle rate-limit keys
        self.store.purge_stale_codes(now);
        self.prune_request_log(now);

        tracing::info!(email = %email, "Verification code issued");
        Ok(())
    }

    /// Redeem a code from the given origin address.
    ///
    /// On success the code is marked used (at-most-once), the identity is
    /// created or loaded, the origin address is unioned into its authorized
    /// set, and a new session is established.
    pub fn redeem(&self, email: &str, code: &str, address: &str) -> Result<(AdminIdentity, Session)> {
        let email = normalize_email(email)?;
        self.store.redeem_code(&email, code, Utc::now())?;

        let identity = self.store.authorize_address(&email, address);
        let session = self
            .store
            .create_session(&email, Duration::hours(self.config.session_ttl_hours));

        tracing::info!(email = %email, address = %address, "Admin authenticated");
        Ok((identity, session))
    }

    /// Drop rate-limit entries whose timestamps are all outside the window.
    /// `/auth/code` is unauthenticated, so without this the map grows one
    /// entry per distinct email string ever requested.
    fn prune_request_log(&self, now: DateTime<Utc>) {
        let window = Duration::seconds(self.config.code_request_window_secs);
        self.request_log.retain(|_, timestamps| {
            timestamps.retain(|t| now - *t < window);
            !timestamps.is_empty()
        });
    }

    fn check_rate_limit(&self, email: &str) -> Result<()> {
        let now = Utc::now();
        let window = Duration::seconds(self.config.code_request_window_secs);

        let mut timestamps = self.request_log.entry(email.to_string()).or_default();
        timestamps.retain(|t| now - *t < window);
        if timestamps.len() >= self.config.code_request_limit as usize {
            return Err(Error::RateLimited(format!(
                "too many code requests for {}",
                email
            )));
        }
        timestamps.push(now);
        Ok(())
    }
}

/// Lowercase and minimally validate an email address
fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::Validation("email is required".into()));
    }
    Ok(email)
}

/// Cryptographically random 6-digit code, zero-padded
fn generate_code() -> String {
    format!("{:06}", OsRng.gen_range(0..1_000_000u32))
}
