//! Google sign-in — authorization URL, code exchange, and userinfo fetch.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::ApiError;

/// OAuth scopes requested at login.
const SCOPES: &str = "openid profile email";

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    #[allow(dead_code)]
    pub token_type: Option<String>,
    #[allow(dead_code)]
    pub expires_in: Option<i64>,
    #[allow(dead_code)]
    pub id_token: Option<String>,
}

/// Identity fields from Google's userinfo endpoint.
#[derive(Debug, Deserialize)]
pub struct GoogleUser {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Build the consent-screen URL the login route redirects to.
pub fn authorization_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<String, ApiError> {
    let mut url =
        Url::parse(auth_url).map_err(|e| ApiError::Internal(format!("auth url: {e}")))?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", SCOPES)
        .append_pair("state", state);
    Ok(url.into())
}

/// Exchange an authorization code for Google tokens.
pub async fn exchange_authorization_code(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<GoogleTokenResponse, ApiError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("redirect_uri", redirect_uri),
    ];

    let resp = client
        .post(token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| ApiError::Unauthorized(format!("Token exchange failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Unauthorized(format!(
            "Token exchange HTTP {status}: {body}"
        )));
    }

    resp.json::<GoogleTokenResponse>()
        .await
        .map_err(|e| ApiError::Unauthorized(format!("Token response parse error: {e}")))
}

/// Fetch the signed-in user's identity.
pub async fn fetch_userinfo(
    client: &Client,
    userinfo_url: &str,
    access_token: &str,
) -> Result<GoogleUser, ApiError> {
    let resp = client
        .get(userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| ApiError::Unauthorized(format!("Userinfo request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Unauthorized(format!(
            "Userinfo HTTP {status}: {body}"
        )));
    }

    resp.json::<GoogleUser>()
        .await
        .map_err(|e| ApiError::Unauthorized(format!("Userinfo parse error: {e}")))
}
