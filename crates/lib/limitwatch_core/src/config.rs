//! Core configuration for the checking loop and outbound clients.

use std::time::Duration;

/// Configuration for the background checker and its HTTP clients.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    /// Slack workflow webhook URL. `None` disables delivery (sends are
    /// skipped and reported as failed).
    pub webhook_url: Option<String>,
    /// Period between scheduler ticks.
    pub check_interval: Duration,
    /// Per-request timeout for all outbound HTTP calls.
    pub http_timeout: Duration,
    /// Override for the Marketing Cloud auth endpoint base URL.
    /// `None` derives `https://{subdomain}.auth.marketingcloudapis.com`.
    pub sfmc_auth_base_url: Option<String>,
    /// Override for the Marketing Cloud REST endpoint base URL.
    /// `None` derives `https://{subdomain}.rest.marketingcloudapis.com`.
    pub sfmc_rest_base_url: Option<String>,
}

impl CoreConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                | Default                          |
    /// |-------------------------|----------------------------------|
    /// | `WORKFLOW_WEBHOOK_URL`  | unset (delivery disabled)        |
    /// | `CHECK_INTERVAL_SECS`   | `30`                             |
    /// | `HTTP_TIMEOUT_SECS`     | `30`                             |
    /// | `SFMC_AUTH_BASE_URL`    | unset (derived from subdomain)   |
    /// | `SFMC_REST_BASE_URL`    | unset (derived from subdomain)   |
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("WORKFLOW_WEBHOOK_URL").ok(),
            check_interval: Duration::from_secs(env_secs("CHECK_INTERVAL_SECS", 30)),
            http_timeout: Duration::from_secs(env_secs("HTTP_TIMEOUT_SECS", 30)),
            sfmc_auth_base_url: std::env::var("SFMC_AUTH_BASE_URL").ok(),
            sfmc_rest_base_url: std::env::var("SFMC_REST_BASE_URL").ok(),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            check_interval: Duration::from_secs(30),
            http_timeout: Duration::from_secs(30),
            sfmc_auth_base_url: None,
            sfmc_rest_base_url: None,
        }
    }
}

fn env_secs(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
