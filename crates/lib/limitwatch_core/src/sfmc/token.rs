//! Client-credentials token exchange.
//!
//! `POST {auth_base}/v2/token` with a JSON grant body; the response carries
//! the bearer token in `access_token`.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::SfmcError;

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange client credentials for an access token.
///
/// Any transport failure, non-success status, or unparsable body is
/// [`SfmcError::Auth`]; callers must not fetch data without a token.
pub async fn fetch_access_token(
    client: &Client,
    auth_base: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, SfmcError> {
    let url = format!("{auth_base}/v2/token");

    let resp = client
        .post(&url)
        .json(&TokenRequest {
            grant_type: "client_credentials",
            client_id,
            client_secret,
        })
        .send()
        .await
        .map_err(|e| SfmcError::Auth(format!("token request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        return Err(SfmcError::Auth(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let data: TokenResponse = resp
        .json()
        .await
        .map_err(|e| SfmcError::Auth(format!("token response parse error: {e}")))?;

    Ok(data.access_token)
}
