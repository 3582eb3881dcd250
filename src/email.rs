//! Email delivery collaborator
//!
//! Verification codes are handed off to an external delivery capability.
//! Delivery is fire-and-forget from this core's perspective: a failure is
//! logged by the caller and never fails `request_code`.

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Outbound email capability consumed by the code issuer
#[async_trait]
pub trait EmailDelivery: Send + Sync {
    /// Send a verification code to the given address
    async fn send_code(&self, email: &str, code: &str) -> Result<()>;
}

/// Delivery backend that only logs the handoff
///
/// Default for development; the production deployment wires a real
/// transport behind the same trait.
#[derive(Default)]
pub struct TracingEmailDelivery;

#[async_trait]
impl EmailDelivery for TracingEmailDelivery {
    async fn send_code(&self, email: &str, _code: &str) -> Result<()> {
        tracing::info!(email = %email, "Verification code handed to delivery");
        Ok(())
    }
}

/// Capturing delivery backend for tests
#[derive(Default)]
pub struct CaptureEmailDelivery {
    sent: Mutex<Vec<(String, String)>>,
}

impl CaptureEmailDelivery {
    /// All (email, code) pairs handed to this backend
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    /// Most recently delivered code for an email, if any
    pub async fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|(e, _)| e == email)
            .map(|(_, c)| c.clone())
    }
}

#[async_trait]
impl EmailDelivery for CaptureEmailDelivery {
    async fn send_code(&self, email: &str, code: &str) -> Result<()> {
        self.sent
            .lock()
            .await
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}
