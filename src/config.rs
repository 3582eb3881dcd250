//! Operator console configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main console configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Monitoring configuration
    pub monitoring: MonitoringConfig,
}

impl ConsoleConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: ConsoleConfig = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = allow any, development only)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18920,
            cors_origins: Vec::new(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Verification code lifetime in minutes
    pub code_ttl_minutes: i64,

    /// Session lifetime in hours (sliding, refreshed on use)
    pub session_ttl_hours: i64,

    /// Maximum code requests per email per window
    pub code_request_limit: u32,

    /// Rate limit window in seconds
    pub code_request_window_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: 10,
            session_ttl_hours: 24,
            code_request_limit: 5,
            code_request_window_secs: 60,
        }
    }
}

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Default query page size
    pub default_page_size: usize,

    /// Hard cap on caller-requested page size
    pub max_page_size: usize,

    /// Days of trend series served by the dashboard
    pub dashboard_trend_days: i64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 100,
            dashboard_trend_days: 7,
        }
    }
}
