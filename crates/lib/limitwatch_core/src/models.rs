//! Persistent domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered Marketing Cloud account to watch: API credentials, the
/// data-extension key holding the contact count, an alert threshold, and the
/// Slack recipients to notify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub name: String,
    /// Google `sub` claim of the owning user. A contract is visible and
    /// mutable only to its owner.
    pub owner_google_id: String,
    /// Slack user IDs alerted on breach or check failure.
    pub slack_users_ids: Vec<String>,
    pub sfmc_subdomain: String,
    pub client_id: String,
    pub client_secret: String,
    pub de_key: String,
    /// Alert threshold. A check that observes more contacts than this fires
    /// an alert to every recipient.
    pub contacts_limit: i64,
    /// Last observed contact count; 0 until the first successful check.
    pub contacts_amount: i64,
    /// When the last successful check ran. Written only together with
    /// `contacts_amount`.
    pub last_checked: Option<DateTime<Utc>>,
}

/// Owner-supplied fields for a new contract. `contacts_amount` starts at 0
/// and `last_checked` unset until the first successful check.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub name: String,
    pub slack_users_ids: Vec<String>,
    pub sfmc_subdomain: String,
    pub client_id: String,
    pub client_secret: String,
    pub de_key: String,
    pub contacts_limit: i64,
}

/// Parse a comma-separated recipient list as submitted by the dashboard
/// form. Entries are trimmed; empty and whitespace-only entries dropped.
pub fn parse_recipient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
