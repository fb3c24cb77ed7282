//! API server configuration.

use crate::services::session::resolve_session_secret;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// Session JWT signing secret.
    pub session_secret: String,
    /// Google OAuth client id.
    pub google_client_id: String,
    /// Google OAuth client secret.
    pub google_client_secret: String,
    /// Redirect URI registered with Google for `/auth/callback`.
    pub redirect_uri: String,
    /// Google authorization endpoint.
    pub google_auth_url: String,
    /// Google token endpoint.
    pub google_token_url: String,
    /// Google userinfo endpoint.
    pub google_userinfo_url: String,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable               | Default                            |
    /// |------------------------|------------------------------------|
    /// | `BIND_ADDR`            | `127.0.0.1:3100`                   |
    /// | `SESSION_SECRET`       | generated per process              |
    /// | `GOOGLE_CLIENT_ID`     | empty (login disabled)             |
    /// | `GOOGLE_CLIENT_SECRET` | empty (login disabled)             |
    /// | `REDIRECT_URI`         | `http://127.0.0.1:3100/auth/callback` |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".into()),
            session_secret: resolve_session_secret(),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: std::env::var("REDIRECT_URI")
                .unwrap_or_else(|_| "http://127.0.0.1:3100/auth/callback".into()),
            google_auth_url: GOOGLE_AUTH_URL.into(),
            google_token_url: GOOGLE_TOKEN_URL.into(),
            google_userinfo_url: GOOGLE_USERINFO_URL.into(),
        }
    }
}
