//! Marketing Cloud REST client.
//!
//! Two calls per check cycle: a client-credentials token exchange against the
//! tenant's auth endpoint, then an authenticated rowset fetch to read the
//! current contact count from a data extension.

pub mod rowset;
pub mod token;

use reqwest::Client;
use thiserror::Error;

use crate::config::CoreConfig;

/// Marketing Cloud tenant endpoint domain.
const SFMC_DOMAIN: &str = "marketingcloudapis.com";

/// Errors from Marketing Cloud calls.
#[derive(Debug, Error)]
pub enum SfmcError {
    /// Token exchange failed; no data call may be made without a token.
    #[error("Token exchange failed: {0}")]
    Auth(String),

    /// Rowset request failed at the HTTP level.
    #[error("Contact data request failed: {0}")]
    Fetch(String),

    /// Rowset request succeeded but the response shape was unusable.
    #[error("Unexpected contact data shape: {0}")]
    DataFormat(String),
}

/// Client for a Marketing Cloud tenant's auth and REST endpoints.
///
/// Endpoint base URLs are derived from the contract's subdomain unless
/// overridden via [`CoreConfig`] (used by tests and alternate stacks).
#[derive(Clone)]
pub struct SfmcClient {
    http: Client,
    auth_base_url: Option<String>,
    rest_base_url: Option<String>,
}

impl SfmcClient {
    /// Build a client with the configured per-request timeout.
    pub fn new(config: &CoreConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            http,
            auth_base_url: config.sfmc_auth_base_url.clone(),
            rest_base_url: config.sfmc_rest_base_url.clone(),
        })
    }

    fn auth_base(&self, subdomain: &str) -> String {
        match &self.auth_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{subdomain}.auth.{SFMC_DOMAIN}"),
        }
    }

    fn rest_base(&self, subdomain: &str) -> String {
        match &self.rest_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{subdomain}.rest.{SFMC_DOMAIN}"),
        }
    }

    /// Exchange client credentials for a short-lived access token.
    ///
    /// Tokens are valid for one check cycle only and are never cached.
    pub async fn access_token(
        &self,
        subdomain: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, SfmcError> {
        token::fetch_access_token(&self.http, &self.auth_base(subdomain), client_id, client_secret)
            .await
    }

    /// Read the current contact count from a data extension rowset.
    pub async fn contacts_amount(
        &self,
        subdomain: &str,
        de_key: &str,
        access_token: &str,
    ) -> Result<i64, SfmcError> {
        rowset::fetch_contacts_amount(
            &self.http,
            &self.rest_base(subdomain),
            de_key,
            access_token,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_bases_use_tenant_subdomain() {
        let client = SfmcClient::new(&CoreConfig::default()).unwrap();
        assert_eq!(
            client.auth_base("mc123"),
            "https://mc123.auth.marketingcloudapis.com"
        );
        assert_eq!(
            client.rest_base("mc123"),
            "https://mc123.rest.marketingcloudapis.com"
        );
    }

    #[test]
    fn overrides_win_and_trailing_slash_is_dropped() {
        let config = CoreConfig {
            sfmc_auth_base_url: Some("http://127.0.0.1:9999/".into()),
            sfmc_rest_base_url: Some("http://127.0.0.1:9999".into()),
            ..CoreConfig::default()
        };
        let client = SfmcClient::new(&config).unwrap();
        assert_eq!(client.auth_base("ignored"), "http://127.0.0.1:9999");
        assert_eq!(client.rest_base("ignored"), "http://127.0.0.1:9999");
    }
}
